use std::sync::Arc;

use crate::cache::ResourceCache;
use crate::reactions::ReactionClient;

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<ResourceCache>,
    /// `None` when no API key is configured
    pub reactions: Option<Arc<ReactionClient>>,
}
