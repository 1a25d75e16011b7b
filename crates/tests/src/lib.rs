//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置到会话的端到端流程
//! - 身份绑定与持久化标志
//! - 归因回调驱动的分发

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_event_names_are_stable() {
        use contracts::AnalyticsEvent;

        assert_eq!(AnalyticsEvent::APP_INSTALL, "app_install");
        assert_eq!(AnalyticsEvent::USER_SIGN_UP, "user_sign_up");
        assert_eq!(AnalyticsEvent::DEPOSIT, "deposit");
        assert_eq!(AnalyticsEvent::CREATE_INSTANCE, "create_instance");
        assert_eq!(AnalyticsEvent::SCREEN_VIEW, "screen_view");
        assert_eq!(AnalyticsEvent::DEEP_LINK_OPENED, "deep_link_opened");
        assert_eq!(AnalyticsEvent::DEFERRED_DEEP_LINK, "deferred_deep_link");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::time::{Duration, Instant};

    use contracts::{
        ConversionCallback, ConversionData, DeepLinkCallback, DeepLinkData, DeepLinkStatus,
        FlagStore, HASHED_EMAIL_KEY,
    };
    use config_loader::{ConfigFormat, ConfigLoader};
    use dispatcher::{EventDispatcher, MockSink, MockSinkConfig, SinkHandle};
    use session::{
        AttributionListener, ConversionOutcome, FileFlagStore, InstallAttribution,
        MemoryFlagStore, SinkOutcome, TrackingSession,
    };

    fn read_journal(path: &std::path::Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    /// Blueprint -> TrackingSession -> backend stand-ins + journal
    #[tokio::test]
    async fn test_e2e_session_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let journal = dir.path().join("events.jsonl");
        let config = format!(
            r#"
[app]
name = "cloud-console"
scheme = "cloudconsole"

[[sinks]]
name = "firebase"
sink_type = "firebase"

[[sinks]]
name = "meta"
sink_type = "meta"

[[sinks]]
name = "appsflyer"
sink_type = "attribution_platform"

[[sinks]]
name = "journal"
sink_type = "file"
params = {{ path = "{}" }}
"#,
            journal.display()
        );
        let blueprint = ConfigLoader::load_from_str(&config, ConfigFormat::Toml).unwrap();

        let mut session = TrackingSession::from_blueprint(&blueprint).await.unwrap();
        let mut store = MemoryFlagStore::new();

        let install = session.app_launched(&mut store).await.unwrap();
        assert!(install.all_delivered());
        assert_eq!(install.outcomes.len(), 4);

        let sign_up = session.sign_up("User@Example.com ", &mut store).await.unwrap();
        assert!(sign_up.all_delivered());

        session.deposit(99.5, " usd ").await;
        session.screen_view("Dashboard").await;
        session.clear_identity();
        session.create_instance("prod_gpu_001").await;
        session.shutdown().await;

        let expected = identity::hash_email("user@example.com").unwrap().to_string();
        let lines = read_journal(&journal);
        let names: Vec<&str> = lines.iter().map(|l| l["event"].as_str().unwrap()).collect();
        assert_eq!(
            names,
            vec!["app_install", "user_sign_up", "deposit", "screen_view", "create_instance"]
        );
        assert!(lines[0]["params"].get(HASHED_EMAIL_KEY).is_none());
        assert_eq!(lines[1]["params"][HASHED_EMAIL_KEY], expected.as_str());
        assert_eq!(lines[2]["params"]["currency"], "USD");
        assert_eq!(lines[2]["params"]["value"], 99.5);
        assert_eq!(lines[3]["params"]["screen_name"], "Dashboard");
        assert!(lines[4]["params"].get(HASHED_EMAIL_KEY).is_none());
    }

    /// First-launch flag survives a restart through the file store
    #[tokio::test]
    async fn test_e2e_install_fires_once_across_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("flags.json");

        for expected_install in [true, false, false] {
            let sink = MockSink::new("capture");
            let probe = sink.probe();
            let dispatcher = EventDispatcher::with_handles(vec![SinkHandle::spawn(sink, 8)]);
            let mut session = TrackingSession::new(dispatcher, Default::default());
            let mut store = FileFlagStore::open(&state).unwrap();

            let report = session.app_launched(&mut store).await;
            assert_eq!(report.is_some(), expected_install);
            assert_eq!(probe.event_names().len(), usize::from(expected_install));
            assert!(!store.is_first_launch().unwrap());
        }
    }

    /// One slow sink and one failing sink do not block or fail the others
    #[tokio::test]
    async fn test_e2e_sink_isolation() {
        let slow = MockSink::with_config(
            "slow",
            MockSinkConfig {
                delay: Duration::from_millis(150),
                ..Default::default()
            },
        );
        let broken = MockSink::failing("broken");
        let healthy = MockSink::new("healthy");
        let healthy_probe = healthy.probe();

        let dispatcher = EventDispatcher::with_handles(vec![
            SinkHandle::spawn(slow, 8),
            SinkHandle::spawn(broken, 8),
            SinkHandle::spawn(healthy, 8),
        ]);
        let mut session = TrackingSession::new(dispatcher, Default::default());

        let started = Instant::now();
        let report = session.deposit(10.0, "eur").await;
        assert!(started.elapsed() < Duration::from_millis(400));

        assert_eq!(report.outcome("slow"), Some(&SinkOutcome::Delivered));
        assert!(matches!(report.outcome("broken"), Some(SinkOutcome::Failed { .. })));
        assert_eq!(report.outcome("healthy"), Some(&SinkOutcome::Delivered));
        assert_eq!(healthy_probe.event_names(), vec!["deposit"]);

        let stats = session.stats();
        assert_eq!(stats.sink_tallies["broken"].failed, 1);
        assert_eq!(stats.sink_tallies["healthy"].delivered, 1);
    }

    /// Conversion then deep link callbacks, in host order
    #[tokio::test]
    async fn test_e2e_attribution_flow() {
        let sink = MockSink::new("capture");
        let probe = sink.probe();
        let dispatcher = EventDispatcher::with_handles(vec![SinkHandle::spawn(sink, 8)]);
        let mut session = TrackingSession::new(dispatcher, Default::default());

        let outcome = session
            .on_conversion_data(ConversionCallback {
                data: Some(ConversionData {
                    af_status: Some("Non-organic".into()),
                    media_source: Some("google_ads".into()),
                    campaign: Some("spring".into()),
                }),
            })
            .await;
        assert_eq!(
            outcome,
            ConversionOutcome::Classified(InstallAttribution::NonOrganic {
                media_source: Some("google_ads".into()),
                campaign: Some("spring".into()),
            })
        );

        let again = session
            .on_conversion_data(ConversionCallback {
                data: Some(ConversionData {
                    af_status: Some("Organic".into()),
                    ..Default::default()
                }),
            })
            .await;
        assert_eq!(again, ConversionOutcome::AlreadyClassified);

        session
            .on_deep_link(DeepLinkCallback {
                deep_link_status: Some(DeepLinkStatus::Found),
                is_deferred: false,
                data: Some(DeepLinkData {
                    deep_link_value: Some("gpu_promo".into()),
                    media_source: Some("email".into()),
                    campaign: Some("launch".into()),
                }),
            })
            .await
            .unwrap();
        let missing = session
            .on_deep_link(DeepLinkCallback {
                deep_link_status: Some(DeepLinkStatus::Error),
                ..Default::default()
            })
            .await;
        assert!(missing.is_none());

        let events = probe.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "deep_link_opened");
        assert_eq!(events[0].str_param("deep_link_value"), Some("gpu_promo"));
        assert_eq!(events[0].str_param("media_source"), Some("email"));
        assert_eq!(events[0].str_param("campaign"), Some("launch"));
    }

    /// Deferred link with empty fields uses configured defaults
    #[tokio::test]
    async fn test_e2e_deferred_deep_link_defaults() {
        let blueprint = ConfigLoader::load_from_str(
            r#"
[app]
name = "demo"

[attribution]
default_media_source = "organic_web"
default_deep_link_value = "home"

[[sinks]]
name = "log"
sink_type = "log"
"#,
            ConfigFormat::Toml,
        )
        .unwrap();

        let sink = MockSink::new("capture");
        let probe = sink.probe();
        let dispatcher = EventDispatcher::with_handles(vec![SinkHandle::spawn(sink, 8)]);
        let mut session = TrackingSession::new(dispatcher, blueprint.attribution.clone());

        session.set_identity("deep@link.io").unwrap();
        session
            .on_deep_link(DeepLinkCallback {
                deep_link_status: Some(DeepLinkStatus::Found),
                is_deferred: true,
                data: Some(DeepLinkData {
                    deep_link_value: None,
                    media_source: Some("  ".into()),
                    campaign: None,
                }),
            })
            .await
            .unwrap();

        let events = probe.events();
        assert_eq!(events[0].name, "deferred_deep_link");
        assert_eq!(events[0].str_param("deep_link_value"), Some("home"));
        assert_eq!(events[0].str_param("media_source"), Some("organic_web"));
        assert!(!events[0].params.contains_key("campaign"));
        assert!(events[0].params.contains_key(HASHED_EMAIL_KEY));
    }

    /// Concurrent dispatches from clones keep their own identity binding
    #[tokio::test]
    async fn test_e2e_identity_bound_per_dispatcher() {
        let sink = MockSink::new("capture");
        let probe = sink.probe();
        let anonymous = EventDispatcher::with_handles(vec![SinkHandle::spawn(sink, 32)]);
        let signed_in =
            anonymous.with_identity(identity::Identity::from_email("a@b.com").unwrap());

        let mut tasks = Vec::new();
        for i in 0..5 {
            let anon = anonymous.clone();
            let named = signed_in.clone();
            tasks.push(tokio::spawn(async move {
                anon.dispatch(&format!("anon_{}", i), Default::default()).await;
                named.dispatch(&format!("named_{}", i), Default::default()).await;
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let events = probe.events();
        assert_eq!(events.len(), 10);
        for event in events {
            assert_eq!(
                event.params.contains_key(HASHED_EMAIL_KEY),
                event.name.starts_with("named_"),
                "{}",
                event.name
            );
        }
    }
}
