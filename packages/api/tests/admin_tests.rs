#![allow(clippy::disallowed_methods)]

mod common;

use std::error::Error;

use api::{BatchPdfRequest, PdfRequest, ServiceError};
use bytes::Bytes;
use chrono::Utc;
use db::repositories::KycRepository;
use kyc_core::{KycId, KycRecord, Priority};

use common::{InMemoryPublisher, service, setup_db};

async fn seed(id: &str) -> Result<KycRecord, Box<dyn Error>> {
    let record = KycRecord::new(id)
        .with_name("Jane Doe")
        .with_email("jane@example.com");
    Ok(KycRepository::create(&record).await?)
}

#[tokio::test]
async fn test_request_pdf_for_existing_record() -> Result<(), Box<dyn Error>> {
    let _guard = setup_db().await?;
    seed("k1").await?;
    let (service, publisher, _) = service(InMemoryPublisher::default()).await;

    let job = service
        .request_pdf(&KycId::new("k1"), "admin-1", PdfRequest::default())
        .await?;
    assert_eq!(job.record_id.as_str(), "k1");
    assert_eq!(job.priority, Priority::NORMAL);

    let request = PdfRequest {
        priority: Some(Priority::new(9)),
    };
    service.request_pdf(&KycId::new("k1"), "admin-1", request).await?;

    let priorities: Vec<u8> = publisher.jobs().iter().map(|(_, p)| p.get()).collect();
    assert_eq!(priorities, vec![5, 9]);
    Ok(())
}

#[tokio::test]
async fn test_request_pdf_for_unknown_record() -> Result<(), Box<dyn Error>> {
    let _guard = setup_db().await?;
    let (service, publisher, _) = service(InMemoryPublisher::default()).await;

    let result = service
        .request_pdf(&KycId::new("missing"), "admin-1", PdfRequest::default())
        .await;

    assert!(matches!(result, Err(ServiceError::RecordNotFound(_))));
    assert!(publisher.jobs().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_request_pdf_with_broker_down() -> Result<(), Box<dyn Error>> {
    let _guard = setup_db().await?;
    seed("k1").await?;
    let (service, _, _) = service(InMemoryPublisher::down()).await;

    let err = service
        .request_pdf(&KycId::new("k1"), "admin-1", PdfRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Broker(_)));
    assert_eq!(err.status_code(), 503);
    Ok(())
}

#[tokio::test]
async fn test_batch_request() -> Result<(), Box<dyn Error>> {
    let _guard = setup_db().await?;
    let (service, publisher, _) = service(InMemoryPublisher::default()).await;

    let request: BatchPdfRequest =
        serde_json::from_str(r#"{"kycIds":["a","b","c"],"priority":2}"#)?;
    let outcome = service.request_batch("admin-1", request).await?;
    assert_eq!(outcome.total, 3);
    assert!(outcome.all_succeeded());
    assert!(publisher.jobs().iter().all(|(_, p)| p.get() == 2));

    let empty = BatchPdfRequest {
        kyc_ids: vec![],
        priority: None,
    };
    assert!(matches!(
        service.request_batch("admin-1", empty).await,
        Err(ServiceError::InvalidRequest(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_status_and_download() -> Result<(), Box<dyn Error>> {
    let _guard = setup_db().await?;
    seed("k1").await?;
    let (service, _, documents) = service(InMemoryPublisher::default()).await;
    let id = KycId::new("k1");

    let status = service.pdf_status(&id).await?;
    assert!(!status.available);
    assert!(matches!(
        service.download_pdf(&id).await,
        Err(ServiceError::PdfNotReady(_))
    ));

    KycRepository::set_pdf_error(&id, "font missing", Utc::now()).await?;
    let status = service.pdf_status(&id).await?;
    assert_eq!(status.error.as_deref(), Some("font missing"));

    let key = documents.put_pdf(&id, Bytes::from_static(b"%PDF-1.4")).await?;
    KycRepository::set_pdf_generated(&id, &key, Utc::now()).await?;

    let status = service.pdf_status(&id).await?;
    assert!(status.available);
    assert_eq!(status.pdf_path.as_deref(), Some("kyc/k1.pdf"));
    assert!(status.error.is_none());

    let pdf = service.download_pdf(&id).await?;
    assert_eq!(pdf, Bytes::from_static(b"%PDF-1.4"));
    Ok(())
}

#[tokio::test]
async fn test_queue_status() -> Result<(), Box<dyn Error>> {
    let _guard = setup_db().await?;
    seed("k1").await?;
    let (service, _, _) = service(InMemoryPublisher::default()).await;

    service
        .request_pdf(&KycId::new("k1"), "admin-1", PdfRequest::default())
        .await?;

    let status = service.pipeline_status().await?;
    assert_eq!(status.queue.queue_name, "pdf_generation_queue");
    assert_eq!(status.queue.message_count, 1);
    assert!(status.worker.is_none());
    assert_eq!(status.storage_backend, "memory");
    Ok(())
}
