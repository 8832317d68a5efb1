use async_trait::async_trait;
use mailing_list::db::{PageParams, StoreError, StoreResult, Subscriber, SubscriberStore};
use mailing_list::model::{
    CreateEmailRequest, DeleteEmailRequest, EmailEntry, GetEmailBatchRequest, GetEmailRequest,
    UpdateEmailRequest,
};
use mailing_list::service::{MailingList, ServiceError};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Store double that records calls and can be told to fail with a storage fault.
#[derive(Default)]
struct RecordingStore {
    rows: Mutex<Vec<Subscriber>>,
    calls: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingStore {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    async fn record(&self, call: String) -> StoreResult<()> {
        self.calls.lock().await.push(call);
        if self.fail {
            return Err(StoreError::Storage(sqlx::Error::PoolClosed));
        }
        Ok(())
    }

    async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl SubscriberStore for RecordingStore {
    async fn ensure_schema(&self) -> StoreResult<()> {
        self.record("ensure_schema".into()).await
    }

    async fn create(&self, address: &str) -> StoreResult<i64> {
        self.record(format!("create {address}")).await?;
        let mut rows = self.rows.lock().await;
        if rows.iter().any(|r| r.address == address) {
            return Err(StoreError::UniquenessViolation(address.into()));
        }
        let id = rows.len() as i64 + 1;
        rows.push(Subscriber {
            id,
            address: address.into(),
            confirmed_at: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
            opt_out: false,
        });
        Ok(id)
    }

    async fn get_by_address(&self, address: &str) -> StoreResult<Option<Subscriber>> {
        self.record(format!("get {address}")).await?;
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|r| r.address == address).cloned())
    }

    async fn get_page(&self, params: PageParams) -> StoreResult<Vec<Subscriber>> {
        self.record(format!("page {} {}", params.page, params.count)).await?;
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .skip(params.offset() as usize)
            .take(params.count as usize)
            .cloned()
            .collect())
    }

    async fn update(&self, subscriber: &Subscriber) -> StoreResult<()> {
        self.record(format!("update {}", subscriber.address)).await?;
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|r| r.address == subscriber.address)
            .ok_or_else(|| StoreError::NotFound(subscriber.address.clone()))?;
        row.confirmed_at = subscriber.confirmed_at;
        row.opt_out = subscriber.opt_out;
        Ok(())
    }

    async fn delete(&self, address: &str) -> StoreResult<u64> {
        self.record(format!("delete {address}")).await?;
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|r| r.address != address);
        Ok((before - rows.len()) as u64)
    }
}

#[tokio::test]
async fn create_reads_back_trimmed_address() {
    let store = Arc::new(RecordingStore::default());
    let svc = MailingList::new(store.clone());

    let resp = svc
        .create_email(CreateEmailRequest {
            email_addr: "  zed@example.com ".into(),
        })
        .await
        .unwrap();
    let entry = resp.email_entry.unwrap();
    assert_eq!(entry.email, "zed@example.com");
    assert_eq!(entry.confirmed_at, 0);

    assert_eq!(
        store.calls().await,
        vec!["create zed@example.com", "get zed@example.com"]
    );
}

#[tokio::test]
async fn update_translates_timestamp() {
    let store = Arc::new(RecordingStore::default());
    let svc = MailingList::new(store.clone());
    svc.create_email(CreateEmailRequest {
        email_addr: "t@example.com".into(),
    })
    .await
    .unwrap();

    let resp = svc
        .update_email(UpdateEmailRequest {
            email_entry: EmailEntry {
                id: 1,
                email: "t@example.com".into(),
                confirmed_at: -86_400,
                opt_out: true,
            },
        })
        .await
        .unwrap();
    let entry = resp.email_entry.unwrap();
    assert_eq!(entry.confirmed_at, -86_400);
    assert!(entry.opt_out);
}

#[tokio::test]
async fn invalid_requests_never_reach_store() {
    let store = Arc::new(RecordingStore::default());
    let svc = MailingList::new(store.clone());

    let err = svc
        .get_email_batch(GetEmailBatchRequest { page: 0, count: 0 })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument(_)));

    let err = svc
        .delete_email(DeleteEmailRequest {
            email_addr: "".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument(_)));

    assert!(store.calls().await.is_empty());
}

#[tokio::test]
async fn storage_faults_propagate() {
    let svc = MailingList::new(Arc::new(RecordingStore::failing()));

    let err = svc
        .get_email(GetEmailRequest {
            email_addr: "x@example.com".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Store(StoreError::Storage(_))));

    let err = svc
        .get_email_batch(GetEmailBatchRequest { page: 0, count: 5 })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Store(StoreError::Storage(_))));
}

#[tokio::test]
async fn update_of_missing_address_fails() {
    let svc = MailingList::new(Arc::new(RecordingStore::default()));
    let err = svc
        .update_email(UpdateEmailRequest {
            email_entry: EmailEntry {
                email: "missing@example.com".into(),
                ..Default::default()
            },
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Store(StoreError::NotFound(_))));
}

#[tokio::test]
async fn out_of_range_confirmation_time_is_rejected() {
    let store = Arc::new(RecordingStore::default());
    let svc = MailingList::new(store.clone());
    svc.create_email(CreateEmailRequest {
        email_addr: "far@example.com".into(),
    })
    .await
    .unwrap();

    let err = svc
        .update_email(UpdateEmailRequest {
            email_entry: EmailEntry {
                id: 1,
                email: "far@example.com".into(),
                confirmed_at: i64::MAX,
                opt_out: true,
            },
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument(_)));

    let stored = svc
        .get_email(GetEmailRequest {
            email_addr: "far@example.com".into(),
        })
        .await
        .unwrap()
        .email_entry
        .unwrap();
    assert_eq!(stored.confirmed_at, 0);
    assert!(!stored.opt_out);
    assert!(!store.calls().await.iter().any(|c| c.starts_with("update")));
}
