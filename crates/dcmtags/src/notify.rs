//! Bookkeeper notification
//!
//! After a file has been filed away, the bookkeeper is told about it with a
//! form POST to `http://<address>/register-dicom`. The request runs on its
//! own thread; its outcome never changes where the file rests or the exit
//! code of the worker. The worker waits at most [`EXIT_GRACE`] for it
//! before exiting, whatever the retry budget of the target.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Path of the registration endpoint.
pub const REGISTER_PATH: &str = "/register-dicom";

/// Longest time a finished run waits for its notification.
pub const EXIT_GRACE: Duration = Duration::from_secs(2);

/// Bookkeeper to notify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyTarget {
    /// `host:port`
    pub address: String,
    pub token: String,
    /// Timeout of a single attempt
    pub timeout: Duration,
    pub attempts: u32,
}

impl NotifyTarget {
    pub fn url(&self) -> String {
        format!("http://{}{}", self.address, REGISTER_PATH)
    }

    /// Longest time a delivery can take.
    pub fn budget(&self) -> Duration {
        self.timeout * self.attempts + Duration::from_millis(250)
    }
}

/// What gets registered for one processed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub filename: String,
    pub file_uid: String,
    pub series_uid: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Bookkeeper answered {0}")]
    Status(u16),
}

/// Send `registration`, retrying on transport errors and 5xx answers.
///
/// Returns the final HTTP status. Blocks the calling thread.
pub fn send(target: &NotifyTarget, registration: &Registration) -> Result<u16, NotifyError> {
    let client = reqwest::blocking::Client::builder().timeout(target.timeout).build()?;
    let url = target.url();
    let form = [
        ("filename", registration.filename.as_str()),
        ("file_uid", registration.file_uid.as_str()),
        ("series_uid", registration.series_uid.as_str()),
    ];

    let mut attempt = 1;
    loop {
        let result = client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, format!("Token {}", target.token))
            .form(&form)
            .send();

        let retry = match &result {
            Ok(response) => response.status().is_server_error(),
            Err(err) => !err.is_builder(),
        };
        if !retry || attempt >= target.attempts {
            let status = result?.status();
            if !status.is_success() {
                return Err(NotifyError::Status(status.as_u16()));
            }
            return Ok(status.as_u16());
        }

        debug!(attempt, url = %url, "Bookkeeper notification failed, retrying");
        attempt += 1;
    }
}

/// A notification running in the background.
#[derive(Debug)]
pub struct Delivery {
    done: mpsc::Receiver<bool>,
    grace: Duration,
}

impl Delivery {
    /// How long [`Delivery::linger`] waits at most.
    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Give the delivery its grace period to finish.
    ///
    /// Returns whether it succeeded, or `None` when it did not finish in
    /// time. An unfinished delivery is abandoned with the process.
    pub fn linger(self) -> Option<bool> {
        self.done.recv_timeout(self.grace).ok()
    }
}

/// Start notifying `target` in the background. No-op without a target.
pub fn notify(target: Option<&NotifyTarget>, registration: Registration) -> Option<Delivery> {
    let target = target?.clone();
    let grace = target.budget().min(EXIT_GRACE);
    let (tx, done) = mpsc::channel();

    let spawned = thread::Builder::new().name("notify".into()).spawn(move || {
        let delivered = match send(&target, &registration) {
            Ok(status) => {
                info!(status, filename = %registration.filename, "Registered with bookkeeper");
                true
            },
            Err(err) => {
                warn!(error = %err, address = %target.address, "Unable to notify bookkeeper");
                false
            },
        };
        let _ = tx.send(delivered);
    });

    match spawned {
        Ok(_) => Some(Delivery { done, grace }),
        Err(err) => {
            warn!(error = %err, "Unable to start notification thread");
            None
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn target(server: &MockServer) -> NotifyTarget {
        NotifyTarget {
            address: server.address().to_string(),
            token: "secret".to_string(),
            timeout: Duration::from_secs(1),
            attempts: 3,
        }
    }

    fn registration() -> Registration {
        Registration {
            filename: "1.2.3#img0001".to_string(),
            file_uid: "9.9.9".to_string(),
            series_uid: "1.2.3".to_string(),
        }
    }

    #[test]
    fn test_url_and_budget() {
        let target = NotifyTarget {
            address: "bookkeeper:8080".to_string(),
            token: String::new(),
            timeout: Duration::from_secs(1),
            attempts: 3,
        };
        assert_eq!(target.url(), "http://bookkeeper:8080/register-dicom");
        assert!(target.budget() > Duration::from_secs(3));
    }

    #[test]
    fn test_no_target_is_a_no_op() {
        assert!(notify(None, registration()).is_none());
    }

    #[tokio::test]
    async fn test_posts_form_with_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(REGISTER_PATH))
            .and(header("Authorization", "Token secret"))
            .and(body_string_contains("filename=1.2.3%23img0001"))
            .and(body_string_contains("file_uid=9.9.9"))
            .and(body_string_contains("series_uid=1.2.3"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let target = target(&server);
        let status = tokio::task::spawn_blocking(move || send(&target, &registration()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status, 201);
    }

    #[tokio::test]
    async fn test_retries_server_errors_up_to_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let target = target(&server);
        let result = tokio::task::spawn_blocking(move || send(&target, &registration()))
            .await
            .unwrap();
        assert!(matches!(result, Err(NotifyError::Status(503))));
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let target = target(&server);
        let result = tokio::task::spawn_blocking(move || send(&target, &registration()))
            .await
            .unwrap();
        assert!(matches!(result, Err(NotifyError::Status(401))));
    }

    #[tokio::test]
    async fn test_background_delivery_reports_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let target = target(&server);
        let delivery = notify(Some(&target), registration()).unwrap();
        let outcome = tokio::task::spawn_blocking(move || delivery.linger()).await.unwrap();
        assert_eq!(outcome, Some(true));
    }

    #[tokio::test]
    async fn test_slow_bookkeeper_is_abandoned_after_grace() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(20)))
            .mount(&server)
            .await;

        let target = NotifyTarget { timeout: Duration::from_secs(30), attempts: 3, ..target(&server) };
        assert!(target.budget() > EXIT_GRACE);

        let delivery = notify(Some(&target), registration()).unwrap();
        assert_eq!(delivery.grace(), EXIT_GRACE);
        let started = std::time::Instant::now();
        let outcome = tokio::task::spawn_blocking(move || delivery.linger()).await.unwrap();
        assert_eq!(outcome, None);
        assert!(started.elapsed() < EXIT_GRACE + Duration::from_secs(2));
    }

    #[test]
    fn test_short_budget_bounds_grace() {
        let target = NotifyTarget {
            address: "127.0.0.1:9".to_string(),
            token: String::new(),
            timeout: Duration::from_millis(100),
            attempts: 1,
        };
        let delivery = notify(Some(&target), registration()).unwrap();
        assert_eq!(delivery.grace(), Duration::from_millis(350));
        let _ = delivery.linger();
    }
}
