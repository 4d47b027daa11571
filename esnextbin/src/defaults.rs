//! Content used when a sketch leaves a file empty.

pub const DESCRIPTION: &str = "esnextbin sketch";

pub const CODE: &str = "// write ES2015 code and import modules from npm
// and then press \"Execute\" to run your program

import $ from 'jquery';

$('body').append('<h1>esnextbin</h1>');
";

pub const HTML: &str = "<!doctype html>
<html>
<head>
  <meta charset=\"utf-8\">
  <title>ESNextbin Sketch</title>
  <!-- put additional styles and scripts here -->
</head>
<body>
  <!-- put markup and other contents here -->
</body>
</html>
";

pub const PACKAGE_JSON: &str = "{
  \"name\": \"esnextbin-sketch\",
  \"version\": \"0.0.0\"
}
";
