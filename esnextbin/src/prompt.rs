use esnextbin_auth::{
    AuthError, AuthMessage, AuthorizationPort, AuthorizationSurface, BrowserSurface,
};
use std::io::BufRead;
use std::sync::Arc;
use url::Url;

/// Opens the reader the pasted code comes from, on the reading thread
pub type InputSource = Arc<dyn Fn() -> Box<dyn BufRead> + Send + Sync>;

/// Terminal stand-in for the authorization popup.
///
/// Opens the browser, then relays the code the user pastes back to the port
/// as a notification from the app's own origin. End of input closes the
/// attempt.
pub struct PromptSurface {
    browser: Arc<dyn AuthorizationSurface>,
    port: AuthorizationPort,
    origin: String,
    input: InputSource,
}

impl PromptSurface {
    pub fn new(port: AuthorizationPort, origin: impl Into<String>) -> Self {
        Self::with_input(
            Arc::new(BrowserSurface),
            port,
            origin,
            Arc::new(|| Box::new(std::io::stdin().lock()) as Box<dyn BufRead>),
        )
    }

    pub fn with_input(
        browser: Arc<dyn AuthorizationSurface>,
        port: AuthorizationPort,
        origin: impl Into<String>,
        input: InputSource,
    ) -> Self {
        Self {
            browser,
            port,
            origin: origin.into(),
            input,
        }
    }
}

impl AuthorizationSurface for PromptSurface {
    fn open(&self, url: &Url) -> Result<(), AuthError> {
        println!("\n=== GitHub Authorization Required ===\n");
        if let Err(e) = self.browser.open(url) {
            eprintln!("Failed to open browser automatically: {}", e);
            eprintln!("\nPlease open this URL in your browser:");
        } else {
            println!("Browser opened. You can also open this URL directly:");
        }
        println!("{}\n", url);
        println!("Paste the authorization code shown after approving, then press Enter:");

        let port = self.port.clone();
        let origin = self.origin.clone();
        let input = self.input.clone();

        // Detached from the runtime; an unanswered prompt must not block shutdown
        std::thread::Builder::new()
            .name("authorization-prompt".to_string())
            .spawn(move || {
                let mut line = String::new();
                let posted = match input().read_line(&mut line) {
                    Ok(0) | Err(_) => port.close(),
                    Ok(_) => port.post(AuthMessage::with_code(origin, line.trim())),
                };
                if !posted {
                    tracing::debug!("Authorization prompt answered after the attempt ended");
                }
            })
            .map_err(|e| {
                AuthError::Surface(format!("Failed to read authorization code: {}", e))
            })?;

        Ok(())
    }
}
