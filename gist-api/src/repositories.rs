use crate::endpoints::{
    gists::{CreateGist, GetGist, NewGist, UpdateGist},
    GistId,
};

pub struct GistRepository;

impl GistRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn get(&self, id: impl Into<GistId>) -> GetGist {
        GetGist::new(id)
    }

    pub fn create(&self, gist: NewGist) -> CreateGist {
        CreateGist::new(gist)
    }

    pub fn update(&self, id: impl Into<GistId>, gist: NewGist) -> UpdateGist {
        UpdateGist::new(id, gist)
    }
}
