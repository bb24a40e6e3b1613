//! The routing data client: cache → retry with backoff → local fallback.

use std::time::Duration;

use fleet_core::Point;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::cache::{geometry_fingerprint, matrix_fingerprint, CacheStats, TtlCache};
use crate::error::{RoutingError, RoutingResult};
use crate::fallback;
use crate::geometry::PathGeometry;
use crate::wire::{RouteResponse, TableResponse, TripResponse};

// ── Configuration ─────────────────────────────────────────────────────────────

/// Client configuration.  `Default` targets the public OSRM instance with a
/// local secondary.
#[derive(Clone, Debug)]
pub struct RoutingConfig {
    pub primary_url: String,
    /// Tried for every attempt after the first failure within one call.
    pub secondary_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Total attempts per call (not per endpoint).
    pub max_retries: u32,
    /// Base backoff; attempt `k` sleeps `retry_delay × k` before retrying.
    pub retry_delay: Duration,
    pub cache_ttl: Duration,
    /// Average speed assumed by fallback geometry, km/h.
    pub fallback_speed_kmh: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            primary_url:        "https://router.project-osrm.org".to_owned(),
            secondary_url:      "http://localhost:5000".to_owned(),
            timeout:            Duration::from_secs(30),
            max_retries:        3,
            retry_delay:        Duration::from_secs(1),
            cache_ttl:          Duration::from_secs(3_600),
            fallback_speed_kmh: 50.0,
        }
    }
}

// ── Envelope validation ───────────────────────────────────────────────────────

/// Shared success-envelope check used inside the retry loop, so a response
/// that parses but reports a service error (or is missing its payload) counts
/// as a failed attempt exactly like a timeout would.
trait Envelope: DeserializeOwned {
    fn validate(&self) -> Result<(), RoutingError>;
}

impl Envelope for TableResponse {
    fn validate(&self) -> Result<(), RoutingError> {
        if self.code != "Ok" {
            return Err(RoutingError::Service(self.code.clone()));
        }
        if self.distances.is_none() {
            return Err(RoutingError::Malformed("table response without distances".into()));
        }
        Ok(())
    }
}

impl Envelope for RouteResponse {
    fn validate(&self) -> Result<(), RoutingError> {
        if self.code != "Ok" {
            return Err(RoutingError::Service(self.code.clone()));
        }
        if self.routes.is_empty() {
            return Err(RoutingError::Malformed("route response without routes".into()));
        }
        Ok(())
    }
}

// ── Client ────────────────────────────────────────────────────────────────────

/// Resolves distances and path geometry via a remote OSRM-shaped service.
///
/// Shared process-wide: caches are keyed by coordinate fingerprints and safe
/// under concurrent callers.  Every public operation returns a value — see
/// the crate docs for the degradation contract.
pub struct RoutingClient {
    http: reqwest::Client,
    config: RoutingConfig,
    pub(crate) matrix_cache: TtlCache<Vec<Vec<f64>>>,
    pub(crate) geometry_cache: TtlCache<PathGeometry>,
}

impl RoutingClient {
    pub fn new(mut config: RoutingConfig) -> Self {
        config.primary_url = config.primary_url.trim_end_matches('/').to_owned();
        config.secondary_url = config.secondary_url.trim_end_matches('/').to_owned();
        let ttl = config.cache_ttl;
        Self {
            http:           reqwest::Client::new(),
            config,
            matrix_cache:   TtlCache::new(ttl),
            geometry_cache: TtlCache::new(ttl),
        }
    }

    // ── Public operations ─────────────────────────────────────────────────

    /// Pairwise travel-distance matrix in kilometres.
    ///
    /// 0 or 1 points short-circuit to a trivial matrix with no network call.
    /// Cache hits younger than the TTL also skip the network.  When every
    /// remote attempt fails, the matrix is computed from great-circle
    /// distances instead — this path cannot fail.
    pub async fn distance_matrix(&self, points: &[Point]) -> Vec<Vec<f64>> {
        match points.len() {
            0 => return Vec::new(),
            1 => return vec![vec![0.0]],
            _ => {}
        }

        let key = matrix_fingerprint(points);
        if let Some(hit) = self.matrix_cache.get(&key) {
            debug!(points = points.len(), "distance matrix cache hit");
            return hit;
        }

        let refs: Vec<&Point> = points.iter().collect();
        let path = format!(
            "/table/v1/driving/{}?annotations=distance,duration",
            coord_path(&refs)
        );

        match self.fetch_with_retry::<TableResponse>(&path, "distance matrix").await {
            Ok(resp) => {
                // validate() guarantees the payload is present.
                let matrix: Vec<Vec<f64>> = resp
                    .distances
                    .unwrap_or_default()
                    .into_iter()
                    .map(|row| row.into_iter().map(|m| m / 1_000.0).collect())
                    .collect();
                if matrix.len() != points.len() {
                    warn!(
                        expected = points.len(),
                        got = matrix.len(),
                        "distance matrix has wrong dimensions, using great-circle fallback"
                    );
                    return fallback::haversine_matrix(points);
                }
                self.matrix_cache.insert(key, matrix.clone());
                matrix
            }
            Err(err) => {
                warn!(%err, "all routing endpoints failed, using great-circle matrix");
                fallback::haversine_matrix(points)
            }
        }
    }

    /// Detailed path geometry from `start` to `end` through `via`, in order.
    ///
    /// Same cache/retry discipline as [`distance_matrix`][Self::distance_matrix],
    /// keyed by the full ordered coordinate path.  The fallback is a
    /// straight-line polyline through the points at
    /// [`RoutingConfig::fallback_speed_kmh`]; it always succeeds.
    pub async fn route_geometry(&self, start: &Point, end: &Point, via: &[Point]) -> PathGeometry {
        let mut points: Vec<&Point> = Vec::with_capacity(via.len() + 2);
        points.push(start);
        points.extend(via.iter());
        points.push(end);

        let key = geometry_fingerprint(&points);
        if let Some(hit) = self.geometry_cache.get(&key) {
            debug!("route geometry cache hit");
            return hit;
        }

        let path = format!(
            "/route/v1/driving/{}?geometries=geojson&overview=full&steps=true",
            coord_path(&points)
        );

        match self.fetch_with_retry::<RouteResponse>(&path, "route geometry").await {
            Ok(mut resp) => {
                // validate() guarantees at least one route.
                let geometry = resp.routes.swap_remove(0).into_geometry();
                self.geometry_cache.insert(key, geometry.clone());
                geometry
            }
            Err(err) => {
                warn!(%err, "all routing endpoints failed, using straight-line geometry");
                fallback::straight_line_geometry(&points, self.config.fallback_speed_kmh)
            }
        }
    }

    /// Near-optimal visiting order for `points` with a fixed start/end depot.
    ///
    /// Single attempt against the primary endpoint; any failure degrades to
    /// the identity order.  No cache, no local optimization.
    pub async fn optimized_visit_order(&self, depot: &Point, points: &[Point]) -> Vec<usize> {
        let identity: Vec<usize> = (0..points.len()).collect();
        if points.is_empty() {
            return identity;
        }

        let mut all: Vec<&Point> = Vec::with_capacity(points.len() + 1);
        all.push(depot);
        all.extend(points.iter());

        let url = format!(
            "{}/trip/v1/driving/{}?source=first&destination=first&roundtrip=true",
            self.config.primary_url,
            coord_path(&all)
        );

        match self.try_get::<TripResponse>(&url).await {
            Ok(resp) if resp.code == "Ok" => resp.visit_order(points.len()).unwrap_or(identity),
            Ok(resp) => {
                warn!(code = %resp.code, "trip optimization rejected, keeping input order");
                identity
            }
            Err(err) => {
                warn!(%err, "trip optimization unavailable, keeping input order");
                identity
            }
        }
    }

    /// Drop every cached matrix and geometry.
    pub fn clear_cache(&self) {
        self.matrix_cache.clear();
        self.geometry_cache.clear();
        debug!("routing caches cleared");
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            matrix_entries:   self.matrix_cache.len(),
            matrix_valid:     self.matrix_cache.valid_len(),
            geometry_entries: self.geometry_cache.len(),
            geometry_valid:   self.geometry_cache.valid_len(),
            ttl_secs:         self.config.cache_ttl.as_secs(),
        }
    }

    // ── Request plumbing ──────────────────────────────────────────────────

    /// Issue `path` with the retry/endpoint-switch discipline.
    ///
    /// Attempt 0 goes to the primary endpoint; every attempt after the first
    /// failure goes to the secondary.  Backoff grows linearly with the
    /// attempt number.  Returns the last error if all attempts fail.
    async fn fetch_with_retry<T: Envelope>(&self, path: &str, what: &str) -> RoutingResult<T> {
        let attempts = self.config.max_retries.max(1);
        let mut last_err = RoutingError::Service("unreachable".to_owned());

        for attempt in 0..attempts {
            let base = if attempt == 0 {
                &self.config.primary_url
            } else {
                &self.config.secondary_url
            };
            let url = format!("{base}{path}");

            let outcome = match self.try_get::<T>(&url).await {
                Ok(resp) => resp.validate().map(|()| resp),
                Err(err) => Err(err),
            };

            match outcome {
                Ok(resp) => return Ok(resp),
                Err(err) => {
                    warn!(attempt = attempt + 1, %err, "{what} request failed");
                    last_err = err;
                }
            }

            if attempt + 1 < attempts {
                tokio::time::sleep(self.config.retry_delay * (attempt + 1)).await;
            }
        }

        Err(last_err)
    }

    async fn try_get<T: DeserializeOwned>(&self, url: &str) -> RoutingResult<T> {
        let resp = self
            .http
            .get(url)
            .timeout(self.config.timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RoutingError::Status(status));
        }

        resp.json::<T>()
            .await
            .map_err(|e| RoutingError::Malformed(e.to_string()))
    }
}

/// Semicolon-joined `lon,lat` path segment, as the service expects.
fn coord_path(points: &[&Point]) -> String {
    let coords: Vec<String> = points
        .iter()
        .map(|p| format!("{:.6},{:.6}", p.position.lon, p.position.lat))
        .collect();
    coords.join(";")
}
