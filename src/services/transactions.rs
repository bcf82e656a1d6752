//! Income and expense transactions

use futures::Stream;

use crate::channel::AuthenticatedChannel;
use crate::error::Result;
use crate::transport::ApiRequest;
use crate::types::{
    CreateTransaction, EditTransaction, Page, PageRequest, Transaction, TransactionId,
};

const TRANSACTIONS: &str = "/transactions";

/// Transaction endpoints
#[derive(Debug, Clone, Copy)]
pub struct TransactionService<'a> {
    channel: &'a AuthenticatedChannel,
}

impl<'a> TransactionService<'a> {
    pub(crate) fn new(channel: &'a AuthenticatedChannel) -> Self {
        Self { channel }
    }

    /// Every transaction of the signed-in user
    ///
    /// # Errors
    ///
    /// Returns the channel's errors.
    pub async fn list(&self) -> Result<Vec<Transaction>> {
        self.channel.get_json(TRANSACTIONS).await
    }

    /// One page of transactions matching the request's filters
    ///
    /// # Errors
    ///
    /// Returns the channel's errors.
    pub async fn page(&self, request: &PageRequest) -> Result<Page<Transaction>> {
        self.channel.fetch(page_query(request)).await
    }

    /// Stream every matching transaction, fetching pages on demand.
    ///
    /// The stream ends after the last page or after the first error.
    #[must_use = "streams do nothing unless polled"]
    pub fn stream(&self, request: PageRequest) -> impl Stream<Item = Result<Transaction>> + 'a {
        let channel = self.channel;
        async_stream::stream! {
            let mut request = request;
            loop {
                let page: Page<Transaction> = match channel.fetch(page_query(&request)).await {
                    Ok(page) => page,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                };
                let has_next = page.has_next() && !page.data.is_empty();
                for transaction in page.data {
                    yield Ok(transaction);
                }
                if !has_next {
                    break;
                }
                request = request.next();
            }
        }
    }

    /// One transaction
    ///
    /// # Errors
    ///
    /// Returns the channel's errors.
    pub async fn get(&self, id: TransactionId) -> Result<Transaction> {
        self.channel.get_json(&format!("{TRANSACTIONS}/{id}")).await
    }

    /// Record a transaction
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Status` with validation messages on rejection.
    pub async fn create(&self, transaction: &CreateTransaction) -> Result<Transaction> {
        self.channel.post_json(TRANSACTIONS, transaction).await
    }

    /// Replace a transaction
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Status` with validation messages on rejection.
    pub async fn update(
        &self,
        id: TransactionId,
        transaction: &EditTransaction,
    ) -> Result<Transaction> {
        self.channel
            .put_json(&format!("{TRANSACTIONS}/{id}"), transaction)
            .await
    }

    /// Delete a transaction
    ///
    /// # Errors
    ///
    /// Returns the channel's errors.
    pub async fn delete(&self, id: TransactionId) -> Result<()> {
        self.channel.delete(&format!("{TRANSACTIONS}/{id}")).await
    }
}

/// `GET /transactions/paged` with paging and filters flattened into the query
fn page_query(request: &PageRequest) -> ApiRequest {
    let mut query = ApiRequest::get(format!("{TRANSACTIONS}/paged"))
        .query("page", request.page.to_string())
        .query("recordsPerPage", request.records_per_page.to_string());

    if let Some(filters) = &request.filters {
        if let Some(description) = &filters.description {
            query = query.query("description", description.clone());
        }
        if let Some(category_id) = filters.category_id {
            query = query.query("categoryId", category_id.to_string());
        }
        if let Some(kind) = filters.kind {
            query = query.query("type", u8::from(kind).to_string());
        }
        if let Some(start) = filters.start_date {
            query = query.query("startDate", start.to_string());
        }
        if let Some(end) = filters.end_date {
            query = query.query("endDate", end.to_string());
        }
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TransactionFilter, TransactionType};
    use chrono::NaiveDate;

    #[test]
    fn test_page_query_flattens_filters() {
        let request = PageRequest {
            page: 2,
            records_per_page: 10,
            filters: Some(TransactionFilter {
                description: None,
                category_id: Some(7.into()),
                kind: Some(TransactionType::Expense),
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
                end_date: None,
            }),
        };

        let query = page_query(&request);
        assert_eq!(query.path(), "/transactions/paged");
        let pairs: Vec<(&str, &str)> = query
            .query_pairs()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("page", "2"),
                ("recordsPerPage", "10"),
                ("categoryId", "7"),
                ("type", "0"),
                ("startDate", "2024-01-01"),
            ]
        );
    }
}
