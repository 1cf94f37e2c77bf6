//! HTTP client for the ledger service.
//!
//! The ledger bridge exposes one REST tree per budget:
//!
//! - `GET    {root}/v1/budgets/{budget}/accounts`
//! - `GET    .../accounts/{id}/balance`
//! - `GET    .../accounts/{id}/transactions?since_date=..&until_date=..`
//! - `POST   .../accounts/{id}/transactions/import`
//! - `PATCH  .../transactions/{id}`, `DELETE .../transactions/{id}`
//! - `GET    .../categories`, `.../categorygroups`, `.../payees`
//! - `POST   .../payees`
//! - `GET    .../months/{month}`, `PATCH .../months/{month}/categories/{id}`
//! - `GET    .../schedules`, `POST .../schedules`, `DELETE .../schedules/{id}`
//! - `POST   .../sync`
//!
//! Successful responses wrap their payload as `{ "data": ... }`. Failures
//! carry `{ "error": "..." }` or plain text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use url::Url;

use super::{LedgerDataAccess, LedgerError};
use crate::{
    config::Config,
    models::{
        account::Account,
        budget::BudgetMonth,
        category::{Category, CategoryGroup},
        payee::Payee,
        schedule::{NewSchedule, Schedule},
        transaction::{NewTransaction, Transaction, TransactionUpdate},
    },
};

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Default, Deserialize)]
struct ImportResult {
    #[serde(default)]
    added: Vec<String>,

    #[serde(default)]
    updated: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ImportRequest<'a> {
    transactions: [&'a NewTransaction; 1],
}

/// Ledger client backed by `reqwest`.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct HttpLedgerClient {
    http: reqwest::Client,

    /// Server root, used for liveness checks
    root: Url,

    /// `{root}/v1/budgets/{budget}`
    budget: Url,

    api_key: String,
}

impl HttpLedgerClient {
    /// Build a client from configuration and verify the server is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `LEDGER_SERVER_URL` is not an absolute http(s) URL
    /// - The HTTP client cannot be constructed
    /// - The server does not answer the liveness check
    pub async fn connect(config: &Config) -> Result<Self, LedgerError> {
        let client = Self::new(
            &config.ledger_server_url,
            &config.ledger_budget_id,
            &config.ledger_api_key,
            Duration::from_secs(config.ledger_timeout_secs),
        )?;

        client.ping().await?;
        tracing::info!("Connected to ledger at {}", client.root);

        Ok(client)
    }

    pub fn new(
        server_url: &str,
        budget_id: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, LedgerError> {
        let root = Url::parse(server_url)?;
        if root.cannot_be_a_base() {
            return Err(LedgerError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }

        let budget = append_segments(&root, &["v1", "budgets", budget_id]);
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            root,
            budget,
            api_key: api_key.to_string(),
        })
    }

    /// Budget-scoped URL with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        append_segments(&self.budget, segments)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Response, LedgerError> {
        tracing::debug!("{} {}", method, url.path());

        let mut request = self
            .http
            .request(method, url)
            .header(API_KEY_HEADER, &self.api_key);
        if let Some(body) = body {
            request = request.json(body);
        }

        check_status(request.send().await?).await
    }

    async fn get_data<T: DeserializeOwned>(&self, url: Url) -> Result<T, LedgerError> {
        let response = self.send::<()>(Method::GET, url, None).await?;
        let envelope: DataEnvelope<T> = response.json().await?;
        Ok(envelope.data)
    }
}

/// Push path segments onto a copy of `base`, dropping a trailing empty segment.
fn append_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Turn a non-success response into `LedgerError::Rejected`.
async fn check_status(response: Response) -> Result<Response, LedgerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|e| e.error)
        .unwrap_or(body);

    Err(LedgerError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl LedgerDataAccess for HttpLedgerClient {
    async fn list_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        self.get_data(self.endpoint(&["accounts"])).await
    }

    async fn get_account_balance(&self, account_id: &str) -> Result<i64, LedgerError> {
        self.get_data(self.endpoint(&["accounts", account_id, "balance"]))
            .await
    }

    async fn list_transactions(
        &self,
        account_id: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let mut url = self.endpoint(&["accounts", account_id, "transactions"]);
        url.query_pairs_mut()
            .append_pair("since_date", start)
            .append_pair("until_date", end);

        self.get_data(url).await
    }

    async fn add_transaction(
        &self,
        account_id: &str,
        transaction: &NewTransaction,
    ) -> Result<String, LedgerError> {
        let url = self.endpoint(&["accounts", account_id, "transactions", "import"]);
        let body = ImportRequest {
            transactions: [transaction],
        };

        let response = self.send(Method::POST, url, Some(&body)).await?;
        let envelope: DataEnvelope<ImportResult> = response.json().await?;
        let ImportResult { added, updated } = envelope.data;

        // A repeated imported_id lands in `updated` instead of `added`
        added
            .into_iter()
            .chain(updated)
            .next()
            .ok_or_else(|| LedgerError::UnexpectedResponse("import returned no id".to_string()))
    }

    async fn update_transaction(
        &self,
        transaction_id: &str,
        update: &TransactionUpdate,
    ) -> Result<(), LedgerError> {
        let url = self.endpoint(&["transactions", transaction_id]);
        self.send(Method::PATCH, url, Some(&json!({ "transaction": update })))
            .await?;
        Ok(())
    }

    async fn delete_transaction(&self, transaction_id: &str) -> Result<(), LedgerError> {
        let url = self.endpoint(&["transactions", transaction_id]);
        self.send::<()>(Method::DELETE, url, None).await?;
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, LedgerError> {
        self.get_data(self.endpoint(&["categories"])).await
    }

    async fn list_category_groups(&self) -> Result<Vec<CategoryGroup>, LedgerError> {
        self.get_data(self.endpoint(&["categorygroups"])).await
    }

    async fn list_payees(&self) -> Result<Vec<Payee>, LedgerError> {
        self.get_data(self.endpoint(&["payees"])).await
    }

    async fn create_payee(&self, name: &str) -> Result<String, LedgerError> {
        let url = self.endpoint(&["payees"]);
        let response = self
            .send(Method::POST, url, Some(&json!({ "payee": { "name": name } })))
            .await?;
        let envelope: DataEnvelope<String> = response.json().await?;
        Ok(envelope.data)
    }

    async fn get_budget_month(&self, month: &str) -> Result<BudgetMonth, LedgerError> {
        self.get_data(self.endpoint(&["months", month])).await
    }

    async fn set_budget_amount(
        &self,
        month: &str,
        category_id: &str,
        amount: i64,
    ) -> Result<(), LedgerError> {
        let url = self.endpoint(&["months", month, "categories", category_id]);
        self.send(
            Method::PATCH,
            url,
            Some(&json!({ "category": { "budgeted": amount } })),
        )
        .await?;
        Ok(())
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>, LedgerError> {
        self.get_data(self.endpoint(&["schedules"])).await
    }

    async fn create_schedule(&self, schedule: &NewSchedule) -> Result<String, LedgerError> {
        let url = self.endpoint(&["schedules"]);
        let response = self
            .send(Method::POST, url, Some(&json!({ "schedule": schedule })))
            .await?;
        let envelope: DataEnvelope<String> = response.json().await?;
        Ok(envelope.data)
    }

    async fn delete_schedule(&self, schedule_id: &str) -> Result<(), LedgerError> {
        let url = self.endpoint(&["schedules", schedule_id]);
        self.send::<()>(Method::DELETE, url, None).await?;
        Ok(())
    }

    async fn synchronize(&self) -> Result<(), LedgerError> {
        let url = self.endpoint(&["sync"]);
        self.send::<()>(Method::POST, url, None).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), LedgerError> {
        // Any answer below 500 means the server is up, even an auth rejection
        let response = self.http.get(self.root.clone()).send().await?;
        if response.status().is_server_error() {
            return Err(LedgerError::Rejected {
                status: response.status().as_u16(),
                message: "ledger server is unhealthy".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(server: &str) -> HttpLedgerClient {
        HttpLedgerClient::new(server, "budget-1", "secret", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn endpoints_are_rooted_at_the_budget() {
        let client = client("http://localhost:5007");
        assert_eq!(
            client.endpoint(&["accounts", "acc_1", "balance"]).as_str(),
            "http://localhost:5007/v1/budgets/budget-1/accounts/acc_1/balance"
        );
    }

    #[test]
    fn trailing_slash_on_server_url_is_ignored() {
        let client = client("http://localhost:5007/ledger/");
        assert_eq!(
            client.endpoint(&["payees"]).as_str(),
            "http://localhost:5007/ledger/v1/budgets/budget-1/payees"
        );
    }

    #[test]
    fn ids_are_percent_encoded() {
        let client = client("http://localhost:5007");
        assert_eq!(
            client.endpoint(&["transactions", "a/b c"]).as_str(),
            "http://localhost:5007/v1/budgets/budget-1/transactions/a%2Fb%20c"
        );
    }

    #[test]
    fn relative_server_url_is_rejected() {
        let result =
            HttpLedgerClient::new("localhost", "budget-1", "secret", Duration::from_secs(5));
        assert!(matches!(result, Err(LedgerError::InvalidUrl(_))));
    }
}
