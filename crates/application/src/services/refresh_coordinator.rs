//! Refresh coordinator
//!
//! Owns the polling state of one configured location: issues the primary
//! forecast request, refreshes the life index on its own slower cadence, and
//! publishes the merged [`Snapshot`] to readers and listeners.
//!
//! Readers always see either the previous or the new snapshot. A failed or
//! timed-out cycle commits nothing.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, TimeDelta, Timelike, Utc};
use domain::entities::{LifeIndexMap, Snapshot, WeatherPayload};
use domain::value_objects::{GeoLocation, UnitSystem};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use super::life_index::select_life_index;
use crate::error::{ApplicationError, RequestKind};
use crate::ports::{ClockPort, ForecastRequest, WeatherProviderPort};

/// Default bound for each outbound request in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default life index refresh threshold in seconds
pub const DEFAULT_LIFE_INDEX_TTL_SECS: u64 = 3600;

/// Callback invoked with every committed snapshot
pub type SnapshotListener = Arc<dyn Fn(Arc<Snapshot>) + Send + Sync>;

/// Polling parameters of one location
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorConfig {
    pub location: GeoLocation,
    /// Identifier stamped into every snapshot
    pub location_key: String,
    pub daily_steps: u32,
    pub hourly_steps: u32,
    pub alert: bool,
    /// Whether the life index feed is fetched at all
    pub life_index: bool,
    /// Shift of the forecast anchor in days
    pub start_offset_days: i64,
    pub unit_system: UnitSystem,
    pub request_timeout: Duration,
    pub life_index_ttl: Duration,
}

impl CoordinatorConfig {
    /// Configuration with the provider's usual defaults for a location
    #[must_use]
    pub fn new(location: GeoLocation) -> Self {
        Self {
            location_key: location.location_key(),
            location,
            daily_steps: 5,
            hourly_steps: 24,
            alert: true,
            life_index: false,
            start_offset_days: 0,
            unit_system: UnitSystem::Metric,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            life_index_ttl: Duration::from_secs(DEFAULT_LIFE_INDEX_TTL_SECS),
        }
    }
}

/// Last selected life index and when it was fetched
#[derive(Debug, Clone, PartialEq)]
pub struct LifeIndexCache {
    pub entries: LifeIndexMap,
    pub fetched_at: DateTime<Utc>,
}

/// Coordinates refresh cycles for one location
pub struct RefreshCoordinator {
    provider: Arc<dyn WeatherProviderPort>,
    clock: Arc<dyn ClockPort>,
    config: CoordinatorConfig,
    current: ArcSwapOption<Snapshot>,
    life_index: ArcSwapOption<LifeIndexCache>,
    refresh_lock: Mutex<()>,
    listeners: RwLock<Vec<SnapshotListener>>,
}

impl fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("config", &self.config)
            .field("has_snapshot", &self.current.load().is_some())
            .field("listeners", &self.listeners.read().len())
            .finish_non_exhaustive()
    }
}

impl RefreshCoordinator {
    /// Create a coordinator with no snapshot and an empty life index cache
    pub fn new(
        provider: Arc<dyn WeatherProviderPort>,
        clock: Arc<dyn ClockPort>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            provider,
            clock,
            config,
            current: ArcSwapOption::empty(),
            life_index: ArcSwapOption::empty(),
            refresh_lock: Mutex::new(()),
            listeners: RwLock::new(Vec::new()),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Last committed snapshot
    #[must_use]
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    /// Cached life index, if one has been fetched
    #[must_use]
    pub fn life_index_cache(&self) -> Option<Arc<LifeIndexCache>> {
        self.life_index.load_full()
    }

    /// Register a listener for committed snapshots
    pub fn subscribe(&self, listener: SnapshotListener) {
        self.listeners.write().push(listener);
    }

    /// Run one refresh cycle
    ///
    /// Cycles are serialized; a call made while another is in flight waits for
    /// it. Network errors are returned without retrying.
    #[instrument(skip(self), fields(location = %self.config.location_key))]
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, ApplicationError> {
        let _cycle = self.refresh_lock.lock().await;
        let now = self.clock.now();

        let request = self.forecast_request(now)?;
        let weather = self
            .bounded(RequestKind::Forecast, self.provider.fetch_forecast(&request))
            .await?;

        let fresh_life_index = if self.life_index_due(now) {
            Some(Arc::new(self.fetch_life_index(&weather, now).await?))
        } else {
            None
        };

        let entries = fresh_life_index
            .as_ref()
            .map(|cache| cache.entries.clone())
            .or_else(|| self.life_index.load().as_ref().map(|cache| cache.entries.clone()))
            .unwrap_or_default();

        let snapshot = Arc::new(Snapshot::merge(
            weather,
            entries,
            self.config.location_key.clone(),
            self.config.unit_system,
        ));

        if let Some(cache) = fresh_life_index {
            self.life_index.store(Some(cache));
        }
        self.current.store(Some(Arc::clone(&snapshot)));

        info!(
            server_time = %snapshot.weather.server_time,
            hours = snapshot.weather.hourly.records.len(),
            days = snapshot.weather.daily.len(),
            life_index = snapshot.lifeindex.len(),
            "Committed weather snapshot"
        );

        self.notify(&snapshot);
        Ok(snapshot)
    }

    fn forecast_request(&self, now: DateTime<Utc>) -> Result<ForecastRequest, ApplicationError> {
        let offset_days = self.config.start_offset_days;
        let timestamp = TimeDelta::try_days(offset_days)
            .and_then(|offset| now.checked_add_signed(offset))
            .ok_or_else(|| {
                ApplicationError::Configuration(format!(
                    "start offset of {offset_days} days is out of range"
                ))
            })?;
        Ok(ForecastRequest {
            location: self.config.location,
            daily_steps: self.config.daily_steps,
            hourly_steps: self.config.hourly_steps,
            alert: self.config.alert,
            unit_system: self.config.unit_system,
            timestamp,
        })
    }

    /// Whether the life index must be fetched in a cycle starting at `now`
    fn life_index_due(&self, now: DateTime<Utc>) -> bool {
        if !self.config.life_index {
            return false;
        }
        let guard = self.life_index.load();
        let Some(cache) = guard.as_ref() else {
            return true;
        };
        let age = now - cache.fetched_at;
        age.to_std()
            .is_ok_and(|age| age >= self.config.life_index_ttl)
    }

    async fn fetch_life_index(
        &self,
        weather: &WeatherPayload,
        now: DateTime<Utc>,
    ) -> Result<LifeIndexCache, ApplicationError> {
        let raw = self
            .bounded(
                RequestKind::LifeIndex,
                self.provider.fetch_life_index(&self.config.location),
            )
            .await?;

        let raw = match raw {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                debug!("Life index feed returned no result, using daily life index");
                weather.daily_life_index.clone()
            },
        };

        let local_hour = now.with_timezone(&weather.local_offset()).hour();
        let entries = select_life_index(&raw, local_hour)?;
        debug!(categories = entries.len(), local_hour, "Selected life index");

        Ok(LifeIndexCache {
            entries,
            fetched_at: now,
        })
    }

    /// Await a provider call within the configured request timeout
    async fn bounded<T>(
        &self,
        request: RequestKind,
        call: impl Future<Output = Result<T, ApplicationError>>,
    ) -> Result<T, ApplicationError> {
        let after = self.config.request_timeout;
        match timeout(after, call).await {
            Ok(result) => result.inspect_err(|e| warn!(%request, error = %e, "Request failed")),
            Err(_) => {
                warn!(%request, ?after, "Request timed out");
                Err(ApplicationError::Timeout { request, after })
            },
        }
    }

    fn notify(&self, snapshot: &Arc<Snapshot>) {
        let listeners = self.listeners.read().clone();
        for listener in listeners {
            listener(Arc::clone(snapshot));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockClockPort, MockWeatherProviderPort};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use domain::entities::{
        AirQuality, HourlySeries, LifeIndexSlot, Minutely, RawLifeIndex, Realtime, Wind,
    };
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn location() -> GeoLocation {
        GeoLocation::new(31.23, 121.47).expect("valid")
    }

    /// 02:00 UTC, 10:00 in Shanghai
    fn morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 2, 0, 0).unwrap()
    }

    fn payload(keypoint: &str) -> WeatherPayload {
        let mut daily_life_index = RawLifeIndex::new();
        daily_life_index.insert("comfort".into(), vec![slot("2024-05-01", "舒适"), slot("2024-05-02", "较舒适")]);
        WeatherPayload {
            server_time: morning(),
            api_version: "v2.6".into(),
            timezone: "Asia/Shanghai".into(),
            tzshift: 28800,
            forecast_keypoint: keypoint.into(),
            realtime: Realtime {
                temperature: 20.0,
                apparent_temperature: 19.0,
                humidity: 0.5,
                cloudrate: 0.0,
                skycon: "CLEAR_DAY".into(),
                visibility: 10.0,
                pressure: 101_000.0,
                wind: Wind::default(),
                precipitation_intensity: 0.0,
                air_quality: AirQuality::default(),
            },
            minutely: Minutely::default(),
            hourly: HourlySeries::default(),
            daily: Vec::new(),
            alerts: Vec::new(),
            regions: Vec::new(),
            daily_life_index,
        }
    }

    fn slot(date: &str, desc: &str) -> LifeIndexSlot {
        LifeIndexSlot {
            date: date.into(),
            desc: desc.into(),
            detail: "今日天气不错".into(),
            extra: BTreeMap::new(),
        }
    }

    fn raw_life_index() -> RawLifeIndex {
        let mut raw = RawLifeIndex::new();
        raw.insert(
            "CarWashingIndex".into(),
            vec![slot("2024-05-01", "适宜"), slot("2024-05-02", "不宜")],
        );
        raw
    }

    fn clock_at(now: DateTime<Utc>) -> Arc<MockClockPort> {
        let mut clock = MockClockPort::new();
        clock.expect_now().return_const(now);
        Arc::new(clock)
    }

    fn life_config() -> CoordinatorConfig {
        CoordinatorConfig {
            life_index: true,
            ..CoordinatorConfig::new(location())
        }
    }

    /// Clock that can be moved between cycles
    struct ManualClock(parking_lot::Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn advance(&self, secs: i64) {
            let mut now = self.0.lock();
            *now += chrono::Duration::seconds(secs);
        }
    }

    impl ClockPort for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock()
        }
    }

    /// Provider whose calls can be delayed to exercise timeouts
    struct SlowProvider {
        forecast_delay: Duration,
        life_index_delay: Duration,
        life_index_calls: AtomicUsize,
    }

    #[async_trait]
    impl WeatherProviderPort for SlowProvider {
        async fn fetch_forecast(
            &self,
            _request: &ForecastRequest,
        ) -> Result<WeatherPayload, ApplicationError> {
            tokio::time::sleep(self.forecast_delay).await;
            Ok(payload("slow"))
        }

        async fn fetch_life_index(
            &self,
            _location: &GeoLocation,
        ) -> Result<Option<RawLifeIndex>, ApplicationError> {
            self.life_index_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.life_index_delay).await;
            Ok(Some(raw_life_index()))
        }
    }

    #[tokio::test]
    async fn test_refresh_commits_snapshot() {
        let mut provider = MockWeatherProviderPort::new();
        provider
            .expect_fetch_forecast()
            .times(1)
            .returning(|_| Ok(payload("晴")));
        provider.expect_fetch_life_index().never();

        let coordinator = RefreshCoordinator::new(
            Arc::new(provider),
            clock_at(morning()),
            CoordinatorConfig::new(location()),
        );

        assert!(coordinator.current().is_none());
        let snapshot = coordinator.refresh().await.expect("refresh");

        assert_eq!(snapshot.weather.forecast_keypoint, "晴");
        assert_eq!(snapshot.location_key, "121.47-31.23");
        assert!(snapshot.lifeindex.is_empty());
        assert!(Arc::ptr_eq(&snapshot, &coordinator.current().expect("current")));
    }

    #[tokio::test]
    async fn test_request_carries_config_and_offset() {
        let mut provider = MockWeatherProviderPort::new();
        provider
            .expect_fetch_forecast()
            .withf(|req| {
                req.daily_steps == 7
                    && req.hourly_steps == 48
                    && !req.alert
                    && req.unit_system == UnitSystem::Imperial
                    && req.timestamp == morning() + chrono::Duration::days(2)
            })
            .times(1)
            .returning(|_| Ok(payload("ok")));

        let config = CoordinatorConfig {
            daily_steps: 7,
            hourly_steps: 48,
            alert: false,
            start_offset_days: 2,
            unit_system: UnitSystem::Imperial,
            ..CoordinatorConfig::new(location())
        };
        let coordinator = RefreshCoordinator::new(Arc::new(provider), clock_at(morning()), config);

        let snapshot = coordinator.refresh().await.expect("refresh");
        assert!(!snapshot.is_metric());
    }

    #[tokio::test]
    async fn test_unrepresentable_offset_is_configuration_error() {
        let mut provider = MockWeatherProviderPort::new();
        provider.expect_fetch_forecast().never();

        let config = CoordinatorConfig {
            start_offset_days: 200_000_000,
            ..CoordinatorConfig::new(location())
        };
        let coordinator = RefreshCoordinator::new(Arc::new(provider), clock_at(morning()), config);

        let err = coordinator.refresh().await.expect_err("offset overflows");
        assert!(matches!(err, ApplicationError::Configuration(_)));
        assert!(!err.is_retryable());
        assert!(coordinator.current().is_none());
    }

    #[tokio::test]
    async fn test_life_index_fetched_once_per_window() {
        let mut provider = MockWeatherProviderPort::new();
        provider
            .expect_fetch_forecast()
            .times(2)
            .returning(|_| Ok(payload("ok")));
        provider
            .expect_fetch_life_index()
            .times(1)
            .returning(|_| Ok(Some(raw_life_index())));

        let clock = Arc::new(ManualClock(parking_lot::Mutex::new(morning())));
        let coordinator = RefreshCoordinator::new(Arc::new(provider), clock.clone(), life_config());

        let first = coordinator.refresh().await.expect("first refresh");
        clock.advance(3599);
        let second = coordinator.refresh().await.expect("second refresh");

        assert_eq!(first.lifeindex, second.lifeindex);
        assert_eq!(second.lifeindex["CarWashingIndex"].description, "适宜");
    }

    #[tokio::test]
    async fn test_life_index_refetched_after_ttl() {
        let mut provider = MockWeatherProviderPort::new();
        provider
            .expect_fetch_forecast()
            .times(2)
            .returning(|_| Ok(payload("ok")));
        provider
            .expect_fetch_life_index()
            .times(2)
            .returning(|_| Ok(Some(raw_life_index())));

        let clock = Arc::new(ManualClock(parking_lot::Mutex::new(morning())));
        let coordinator = RefreshCoordinator::new(Arc::new(provider), clock.clone(), life_config());

        coordinator.refresh().await.expect("first refresh");
        clock.advance(3600);
        coordinator.refresh().await.expect("second refresh");

        let cache = coordinator.life_index_cache().expect("cache");
        assert_eq!(cache.fetched_at, morning() + chrono::Duration::seconds(3600));
    }

    #[tokio::test]
    async fn test_evening_selects_tomorrow_slot() {
        let mut provider = MockWeatherProviderPort::new();
        provider
            .expect_fetch_forecast()
            .returning(|_| Ok(payload("ok")));
        provider
            .expect_fetch_life_index()
            .returning(|_| Ok(Some(raw_life_index())));

        // 11:00 UTC is 19:00 in Shanghai
        let evening = Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap();
        let coordinator = RefreshCoordinator::new(Arc::new(provider), clock_at(evening), life_config());

        let snapshot = coordinator.refresh().await.expect("refresh");
        let entry = &snapshot.lifeindex["CarWashingIndex"];
        assert_eq!(entry.datetime, "2024-05-02");
        assert_eq!(entry.description, "不宜");
        assert_eq!(entry.detail, "明日天气不错");
    }

    #[tokio::test]
    async fn test_life_index_falls_back_to_daily_block() {
        let mut provider = MockWeatherProviderPort::new();
        provider
            .expect_fetch_forecast()
            .returning(|_| Ok(payload("ok")));
        provider.expect_fetch_life_index().returning(|_| Ok(None));

        let coordinator =
            RefreshCoordinator::new(Arc::new(provider), clock_at(morning()), life_config());

        let snapshot = coordinator.refresh().await.expect("refresh");
        assert_eq!(snapshot.lifeindex["comfort"].description, "舒适");
        assert!(!snapshot.lifeindex.contains_key("CarWashingIndex"));
    }

    #[tokio::test]
    async fn test_primary_failure_keeps_previous_snapshot() {
        let mut provider = MockWeatherProviderPort::new();
        let mut calls = 0;
        provider.expect_fetch_forecast().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(payload("first"))
            } else {
                Err(ApplicationError::ConnectionFailed("connection refused".into()))
            }
        });

        let coordinator = RefreshCoordinator::new(
            Arc::new(provider),
            clock_at(morning()),
            CoordinatorConfig::new(location()),
        );

        coordinator.refresh().await.expect("first refresh");
        let err = coordinator.refresh().await.expect_err("second refresh fails");

        assert!(matches!(err, ApplicationError::ConnectionFailed(_)));
        let current = coordinator.current().expect("previous snapshot");
        assert_eq!(current.weather.forecast_keypoint, "first");
    }

    #[tokio::test]
    async fn test_life_index_failure_aborts_cycle() {
        let mut provider = MockWeatherProviderPort::new();
        provider
            .expect_fetch_forecast()
            .returning(|_| Ok(payload("ok")));
        provider
            .expect_fetch_life_index()
            .returning(|_| Err(ApplicationError::ConnectionFailed("reset".into())));

        let coordinator =
            RefreshCoordinator::new(Arc::new(provider), clock_at(morning()), life_config());

        assert!(coordinator.refresh().await.is_err());
        assert!(coordinator.current().is_none());
        assert!(coordinator.life_index_cache().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_primary_timeout_reports_timeout() {
        let provider = SlowProvider {
            forecast_delay: Duration::from_secs(30),
            life_index_delay: Duration::ZERO,
            life_index_calls: AtomicUsize::new(0),
        };
        let coordinator = RefreshCoordinator::new(
            Arc::new(provider),
            clock_at(morning()),
            CoordinatorConfig::new(location()),
        );

        let err = coordinator.refresh().await.expect_err("timeout");
        assert!(matches!(
            err,
            ApplicationError::Timeout {
                request: RequestKind::Forecast,
                after,
            } if after == Duration::from_secs(10)
        ));
        assert!(err.is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn test_life_index_timeout_leaves_state_untouched() {
        let provider = Arc::new(SlowProvider {
            forecast_delay: Duration::ZERO,
            life_index_delay: Duration::ZERO,
            life_index_calls: AtomicUsize::new(0),
        });
        let clock = Arc::new(ManualClock(parking_lot::Mutex::new(morning())));
        let coordinator = RefreshCoordinator::new(provider, clock.clone(), life_config());
        let committed = coordinator.refresh().await.expect("first refresh");
        let cached = coordinator.life_index_cache().expect("cache");

        // Same state, but the life index call now hangs
        let slow = Arc::new(SlowProvider {
            forecast_delay: Duration::ZERO,
            life_index_delay: Duration::from_secs(60),
            life_index_calls: AtomicUsize::new(0),
        });
        let coordinator = RefreshCoordinator {
            provider: slow.clone(),
            ..coordinator
        };
        clock.advance(7200);

        let err = coordinator.refresh().await.expect_err("life index timeout");

        assert!(matches!(
            err,
            ApplicationError::Timeout {
                request: RequestKind::LifeIndex,
                ..
            }
        ));
        assert_eq!(slow.life_index_calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&committed, &coordinator.current().expect("snapshot")));
        assert_eq!(*coordinator.life_index_cache().expect("cache"), *cached);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_refreshes_are_serialized() {
        let provider = Arc::new(SlowProvider {
            forecast_delay: Duration::from_secs(1),
            life_index_delay: Duration::from_secs(1),
            life_index_calls: AtomicUsize::new(0),
        });
        let coordinator = Arc::new(RefreshCoordinator::new(
            provider.clone(),
            clock_at(morning()),
            life_config(),
        ));

        let (a, b) = tokio::join!(coordinator.refresh(), coordinator.refresh());

        assert!(a.is_ok() && b.is_ok());
        // The second cycle sees the cache written by the first
        assert_eq!(provider.life_index_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_listeners_receive_committed_snapshot() {
        let mut provider = MockWeatherProviderPort::new();
        provider
            .expect_fetch_forecast()
            .returning(|_| Ok(payload("notify")));

        let coordinator = RefreshCoordinator::new(
            Arc::new(provider),
            clock_at(morning()),
            CoordinatorConfig::new(location()),
        );
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        coordinator.subscribe(Arc::new(move |snapshot: Arc<Snapshot>| {
            sink.lock().push(snapshot.weather.forecast_keypoint.clone());
        }));

        coordinator.refresh().await.expect("refresh");
        coordinator.refresh().await.expect("refresh");

        assert_eq!(*seen.lock(), vec!["notify".to_string(), "notify".to_string()]);
    }

    #[test]
    fn test_default_config() {
        let config = CoordinatorConfig::new(location());
        assert_eq!(config.daily_steps, 5);
        assert_eq!(config.hourly_steps, 24);
        assert!(config.alert);
        assert!(!config.life_index);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.life_index_ttl, Duration::from_secs(3600));
        assert_eq!(config.location_key, "121.47-31.23");
    }
}
