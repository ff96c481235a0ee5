use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::Emitter;
use crate::collector::{Metric, Record};
use crate::config::InfluxSettings;
use crate::error::{Error, Result};
use crate::snmp::Scalar;

const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// One time-series point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    #[serde(serialize_with = "serialize_time")]
    pub time: DateTime<Utc>,
    pub fields: BTreeMap<String, Scalar>,
}

/// Second-precision UTC timestamp, `2020-04-15T16:03:53`.
pub fn influx_timestamp(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn serialize_time<S: Serializer>(time: &DateTime<Utc>, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&influx_timestamp(time))
}

impl Point {
    pub fn from_record(measurement: &str, record: &Record, time: DateTime<Utc>) -> Self {
        Self {
            measurement: measurement.to_string(),
            tags: record
                .tags()
                .iter()
                .map(|(k, v)| (k.clone(), v.to_string()))
                .collect(),
            time,
            fields: record.fields().iter().cloned().collect(),
        }
    }

    /// Renders the point in line protocol.
    ///
    /// A point without fields, or with a NaN or infinite field, cannot be
    /// written and fails with [`Error::Write`].
    pub fn to_line(&self) -> Result<String> {
        if self.fields.is_empty() {
            return Err(Error::Write(format!("{} point has no fields", self.measurement)));
        }
        let fields = self
            .fields
            .iter()
            .map(|(k, v)| {
                let value = field_value(v).ok_or_else(|| {
                    Error::Write(format!("{} field {} is not finite: {}", self.measurement, k, v))
                })?;
                Ok(format!("{}={}", escape_key(k), value))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut line = escape_measurement(&self.measurement);
        for (key, value) in &self.tags {
            // empty tag values are not allowed
            if value.is_empty() {
                continue;
            }
            line.push(',');
            line.push_str(&escape_key(key));
            line.push('=');
            line.push_str(&escape_key(value));
        }
        line.push(' ');
        line.push_str(&fields.join(","));
        line.push(' ');
        line.push_str(&self.time.timestamp().to_string());
        Ok(line)
    }
}

fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

fn escape_key(s: &str) -> String {
    s.replace(',', "\\,").replace('=', "\\=").replace(' ', "\\ ")
}

fn field_value(value: &Scalar) -> Option<String> {
    match value {
        Scalar::Integer(i) => Some(format!("{}i", i)),
        Scalar::Unsigned(u) => Some(format!("{}u", u)),
        Scalar::Float(f) if f.is_finite() => Some(f.to_string()),
        Scalar::Float(_) => None,
        Scalar::Text(s) => Some(format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))),
    }
}

/// Writes batches to an InfluxDB 1.x `/write` endpoint.
pub struct InfluxEmitter {
    settings: InfluxSettings,
}

impl InfluxEmitter {
    pub fn new(settings: InfluxSettings) -> Self {
        Self { settings }
    }

    pub fn write_url(&self) -> Result<reqwest::Url> {
        let scheme = if self.settings.ssl { "https" } else { "http" };
        let base = format!("{}://{}:{}/write", scheme, self.settings.host, self.settings.port);
        reqwest::Url::parse_with_params(
            &base,
            &[("db", self.settings.dbname.as_str()), ("precision", "s")],
        )
        .map_err(|e| Error::Config(format!("invalid InfluxDB address {}: {}", base, e)))
    }

    fn connect(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(WRITE_TIMEOUT)
            .build()
            .map_err(|e| Error::Write(format!("failed to create HTTP client: {}", e)))
    }

    /// Writes all points in one request.
    ///
    /// A 2xx answer is `Ok(true)`, any other status `Ok(false)`. Transport
    /// failures are logged and returned as [`Error::Write`], as is a batch
    /// holding a point that cannot be rendered; nothing is sent then. The
    /// client only lives for the duration of this call.
    pub async fn write(&self, points: &[Point]) -> Result<bool> {
        let body = match points.iter().map(Point::to_line).collect::<Result<Vec<_>>>() {
            Ok(lines) => lines.join("\n"),
            Err(e) => {
                error!("Refusing to write batch: {}", e);
                return Err(e);
            }
        };
        let url = self.write_url()?;

        let client = self.connect()?;
        let mut request = client.post(url).body(body);
        if !self.settings.user.is_empty() {
            request = request.basic_auth(&self.settings.user, Some(&self.settings.password));
        }
        let sent = request.send().await;

        let outcome = match sent {
            Ok(resp) if resp.status().is_success() => {
                info!("Wrote {} points to InfluxDB", points.len());
                Ok(true)
            }
            Ok(resp) => {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                warn!("InfluxDB rejected write ({}): {}", status, text.trim());
                Ok(false)
            }
            Err(e) => {
                error!("Unexpected error writing points to InfluxDB: {}", e);
                Err(Error::Write(e.to_string()))
            }
        };

        drop(client);
        outcome
    }
}

#[async_trait]
impl Emitter for InfluxEmitter {
    async fn emit(&mut self, metric: Metric, records: &[Record]) -> Result<bool> {
        let time = Utc::now();
        let points: Vec<Point> = records
            .iter()
            .map(|r| Point::from_record(metric.measurement(), r, time))
            .collect();

        if points.is_empty() {
            info!("No {} records to write", metric.table());
            return Ok(true);
        }
        if let Ok(json) = serde_json::to_string(&points) {
            debug!("Points: {}", json);
        }

        self.write(&points).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn disk_record() -> Record {
        let mut record = Record::new();
        record.tag("host", Scalar::from("bigbang"));
        record.tag("disk_number", Scalar::Integer(4));
        record.field("ata_error_count", Scalar::Integer(16));
        record.field("disk_status", Scalar::Integer(0));
        record.field("disk_temperature", Scalar::Integer(35));
        record
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 4, 15, 16, 3, 53).unwrap()
    }

    #[test]
    fn test_point_json_shape() {
        let point = Point::from_record("snmp_disk_stats", &disk_record(), fixed_time());
        assert_eq!(
            serde_json::to_value(&point).unwrap(),
            serde_json::json!({
                "measurement": "snmp_disk_stats",
                "tags": { "host": "bigbang", "disk_number": "4" },
                "time": "2020-04-15T16:03:53",
                "fields": { "ata_error_count": 16, "disk_status": 0, "disk_temperature": 35 }
            })
        );
    }

    #[test]
    fn test_line_protocol() {
        let point = Point::from_record("snmp_disk_stats", &disk_record(), fixed_time());
        assert_eq!(
            point.to_line().unwrap(),
            "snmp_disk_stats,disk_number=4,host=bigbang \
             ata_error_count=16i,disk_status=0i,disk_temperature=35i 1586966633"
        );
    }

    #[test]
    fn test_line_protocol_escaping() {
        let mut record = Record::new();
        record.tag("host", Scalar::from("my nas,1"));
        record.tag("volume_name", Scalar::from(""));
        record.field("volume_raid_level", Scalar::from("say \"hi\""));
        record.field("ratio", Scalar::Float(0.25));

        let line = Point::from_record("snmp_volume_stats", &record, fixed_time())
            .to_line()
            .unwrap();
        assert_eq!(
            line,
            "snmp_volume_stats,host=my\\ nas\\,1 ratio=0.25,volume_raid_level=\"say \\\"hi\\\"\" 1586966633"
        );
    }

    #[test]
    fn test_non_finite_field_is_an_error() {
        let mut record = Record::new();
        record.tag("host", Scalar::from("bigbang"));
        record.field("disk_temperature", Scalar::Integer(35));
        record.field("broken", Scalar::Float(f64::NAN));
        assert!(matches!(
            Point::from_record("m", &record, fixed_time()).to_line(),
            Err(Error::Write(_))
        ));
    }

    #[test]
    fn test_point_without_fields_is_an_error() {
        let mut record = Record::new();
        record.tag("host", Scalar::from("bigbang"));
        assert!(matches!(
            Point::from_record("m", &record, fixed_time()).to_line(),
            Err(Error::Write(_))
        ));
    }

    #[test]
    fn test_unsigned_field() {
        let mut record = Record::new();
        record.field("ifHCInOctets", Scalar::Unsigned(u64::MAX));
        assert_eq!(
            Point::from_record("snmp_interface_stats", &record, fixed_time())
                .to_line()
                .unwrap(),
            "snmp_interface_stats ifHCInOctets=18446744073709551615u 1586966633"
        );
    }

    #[test]
    fn test_write_url() {
        let emitter = InfluxEmitter::new(InfluxSettings {
            host: "influx.local".to_string(),
            port: 8086,
            user: "writer".to_string(),
            password: "secret".to_string(),
            dbname: "readynas".to_string(),
            ssl: false,
        });
        assert_eq!(
            emitter.write_url().unwrap().as_str(),
            "http://influx.local:8086/write?db=readynas&precision=s"
        );
    }

    #[tokio::test]
    async fn test_empty_batch_skips_write() {
        let mut emitter = InfluxEmitter::new(InfluxSettings {
            host: "unreachable.invalid".to_string(),
            port: 8086,
            user: String::new(),
            password: String::new(),
            dbname: "readynas".to_string(),
            ssl: false,
        });
        assert!(emitter.emit(Metric::Fans, &[]).await.unwrap());
    }

    fn settings(port: u16, user: &str) -> InfluxSettings {
        InfluxSettings {
            host: "127.0.0.1".to_string(),
            port,
            user: user.to_string(),
            password: if user.is_empty() { String::new() } else { "secret".to_string() },
            dbname: "readynas".to_string(),
            ssl: false,
        }
    }

    fn points() -> Vec<Point> {
        vec![Point::from_record("snmp_disk_stats", &disk_record(), fixed_time())]
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        body.len() >= length
    }

    /// Answers a single HTTP request with `response` and hands back the raw request.
    async fn serve_once(response: &'static str) -> (u16, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            while !request_complete(&request) {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).into_owned()
        });

        (port, handle)
    }

    #[tokio::test]
    async fn test_write_accepted() {
        let (port, server) =
            serve_once("HTTP/1.1 204 No Content\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                .await;

        let emitter = InfluxEmitter::new(settings(port, "writer"));
        assert!(emitter.write(&points()).await.unwrap());

        let request = server.await.unwrap();
        let lower = request.to_lowercase();
        assert!(request.starts_with("POST /write?db=readynas&precision=s HTTP/1.1"));
        assert!(lower.contains("authorization: basic "));
        assert!(request.ends_with(
            "snmp_disk_stats,disk_number=4,host=bigbang \
             ata_error_count=16i,disk_status=0i,disk_temperature=35i 1586966633"
        ));
    }

    #[tokio::test]
    async fn test_write_rejected() {
        let (port, server) = serve_once(
            "HTTP/1.1 400 Bad Request\r\nContent-Length: 16\r\nConnection: close\r\n\r\nunable to parse\n",
        )
        .await;

        let emitter = InfluxEmitter::new(settings(port, ""));
        assert!(!emitter.write(&points()).await.unwrap());

        let request = server.await.unwrap();
        assert!(!request.to_lowercase().contains("authorization:"));
    }

    #[tokio::test]
    async fn test_write_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let emitter = InfluxEmitter::new(settings(port, ""));
        assert!(matches!(emitter.write(&points()).await, Err(Error::Write(_))));
    }

    #[tokio::test]
    async fn test_unwritable_batch_is_not_sent() {
        let mut record = disk_record();
        record.field("disk_temperature", Scalar::Float(f64::INFINITY));
        let batch = vec![
            Point::from_record("snmp_disk_stats", &disk_record(), fixed_time()),
            Point::from_record("snmp_disk_stats", &record, fixed_time()),
        ];

        // nothing listens here; a send attempt would surface as a transport error
        let emitter = InfluxEmitter::new(settings(1, ""));
        match emitter.write(&batch).await {
            Err(Error::Write(msg)) => assert!(msg.contains("not finite"), "{}", msg),
            other => panic!("expected render failure, got {:?}", other),
        }
    }
}
