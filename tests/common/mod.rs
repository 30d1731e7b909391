#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use nalgebra::Vector3;
use radiocc::constants::{Et, Kilometer, Radian};
use radiocc::ephemeris::{EphemerisProvider, KernelSet, TangentPoint, TangentPointQuery};
use radiocc::time::{et_to_utc, fmt_isoc, parse_utc, utc_to_et};
use radiocc::RadioccError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Impact parameter as a function of epoch, `None` where the geometry is unavailable.
pub type Profile = Arc<dyn Fn(Et) -> Option<Kilometer> + Send + Sync>;

/// Direction of the tangent point from the body centre: 45° north, longitude 0.
pub fn tangent_direction() -> Vector3<f64> {
    Vector3::new(1.0, 0.0, 1.0).normalize()
}

/// In-memory ephemeris driven by an impact parameter profile.
///
/// * The tangent point lies along [`tangent_direction`] at a distance given by the profile.
/// * The Sun is on the body's +Z axis, so every sample has a 45° solar zenith angle.
/// * Solar longitude is `ls` radians, `-0.5` by default (normalized by the scanner).
/// * `initialize` fails on the call whose index (counted over all handles sharing `calls`)
///   equals `fail_on`, or always when the metakernel path is `"missing.tm"`.
pub struct TabulatedProvider {
    profile: Profile,
    calls: Arc<AtomicUsize>,
    fail_on: Option<usize>,
    ls: Radian,
    loaded: bool,
}

impl TabulatedProvider {
    pub fn new(profile: Profile, calls: Arc<AtomicUsize>, fail_on: Option<usize>) -> Self {
        TabulatedProvider {
            profile,
            calls,
            fail_on,
            ls: -0.5,
            loaded: false,
        }
    }

    pub fn with_solar_longitude(mut self, ls: Radian) -> Self {
        self.ls = ls;
        self
    }
}

impl EphemerisProvider for TabulatedProvider {
    fn initialize(&mut self, kernels: &KernelSet) -> Result<(), RadioccError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.loaded = false;
        if kernels.metakernel().as_str() == "missing.tm" || self.fail_on == Some(call) {
            return Err(RadioccError::KernelLoad(format!("init #{call}")));
        }
        self.loaded = true;
        Ok(())
    }

    fn relative_position(
        &mut self,
        target: &str,
        _et: Et,
        _frame: &str,
        _abcorr: &str,
        _observer: &str,
    ) -> Result<Vector3<f64>, RadioccError> {
        assert!(self.loaded, "query before initialize");
        Ok(if target == "SUN" {
            Vector3::new(0.0, 0.0, 2.0e8)
        } else {
            Vector3::new(-1.0, 0.0, 0.0)
        })
    }

    fn tangent_point(
        &mut self,
        _query: &TangentPointQuery<'_>,
        et: Et,
        _ray: &Vector3<f64>,
    ) -> Result<TangentPoint, RadioccError> {
        let ip = (self.profile)(et)
            .ok_or_else(|| RadioccError::Geometry(format!("no tangent point at {et}")))?;
        Ok(TangentPoint {
            point: tangent_direction() * ip,
            altitude: ip - 3397.515,
        })
    }

    fn solar_longitude(
        &mut self,
        _body: &str,
        _et: Et,
        _abcorr: &str,
    ) -> Result<Radian, RadioccError> {
        Ok(self.ls)
    }

    fn time_to_calendar(
        &mut self,
        et: Et,
        _format: &str,
        precision: usize,
    ) -> Result<String, RadioccError> {
        Ok(fmt_isoc(&et_to_utc(et)?, precision))
    }

    fn calendar_to_time(&mut self, calendar: &str) -> Result<Et, RadioccError> {
        Ok(utc_to_et(&parse_utc(calendar)?))
    }
}

/// Factory sharing one profile and one initialization counter.
pub fn factory(
    profile: Profile,
    fail_on: Option<usize>,
) -> (impl Fn() -> TabulatedProvider + Sync, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let shared = calls.clone();
    (
        move || TabulatedProvider::new(profile.clone(), shared.clone(), fail_on),
        calls,
    )
}

/// Profile outside the body except on the given half-open epoch ranges.
pub fn occulted_on(ranges: Vec<(Et, Et)>) -> Profile {
    Arc::new(move |et| {
        let inside = ranges.iter().any(|&(a, b)| a <= et && et < b);
        Some(if inside { 3000.0 } else { 4000.0 })
    })
}

pub fn minutes(base: DateTime<Utc>, min: i64) -> DateTime<Utc> {
    base + TimeDelta::minutes(min)
}

pub fn midnight() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Canned HTTP answer: status line and JSON body.
pub type Answer = (&'static str, &'static str);

/// Serve `n` HTTP requests on a local port, answering each with `route(request)`.
///
/// Returns the `http://host:port` base URL.
pub async fn serve_http<R>(n: usize, route: R) -> String
where
    R: Fn(&str) -> Answer + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let route = Arc::new(route);
    tokio::spawn(async move {
        for _ in 0..n {
            let (mut socket, _) = listener.accept().await.unwrap();
            let route = route.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                let request = String::from_utf8_lossy(&request).into_owned();
                let (status, body) = (*route)(request.as_str());
                let answer = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(answer.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            });
        }
    });
    format!("http://{addr}")
}
