//! Transaction categories

use crate::channel::AuthenticatedChannel;
use crate::error::Result;
use crate::types::{Category, CategoryId, CreateCategory};

const CATEGORIES: &str = "/categories";

/// Category endpoints
#[derive(Debug, Clone, Copy)]
pub struct CategoryService<'a> {
    channel: &'a AuthenticatedChannel,
}

impl<'a> CategoryService<'a> {
    pub(crate) fn new(channel: &'a AuthenticatedChannel) -> Self {
        Self { channel }
    }

    /// All categories of the signed-in user
    ///
    /// # Errors
    ///
    /// Returns the channel's errors.
    pub async fn list(&self) -> Result<Vec<Category>> {
        self.channel.get_json(CATEGORIES).await
    }

    /// Create a category
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Status` with validation messages on rejection.
    pub async fn create(&self, name: impl Into<String>) -> Result<Category> {
        let body = CreateCategory { name: name.into() };
        self.channel.post_json(CATEGORIES, &body).await
    }

    /// Delete a category
    ///
    /// # Errors
    ///
    /// Returns the channel's errors.
    pub async fn delete(&self, id: CategoryId) -> Result<()> {
        self.channel.delete(&format!("{CATEGORIES}/{id}")).await
    }
}
