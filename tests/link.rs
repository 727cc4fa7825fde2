mod tests {
    use embassy_time::Duration;
    use strip_driver::link::STATUS_BLINK_INTERVAL;
    use strip_driver::{ConnectivityEvents, ControlLink, IndicatorLed, MessageBus};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum BusCall {
        Publish(String, String),
        Subscribe(String),
    }

    #[derive(Default)]
    struct MockBus {
        calls: Vec<BusCall>,
        fail: bool,
    }

    impl MessageBus for MockBus {
        type Error = &'static str;

        fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), Self::Error> {
            if self.fail {
                return Err("offline");
            }
            self.calls.push(BusCall::Publish(
                topic.to_owned(),
                String::from_utf8_lossy(payload).into_owned(),
            ));
            Ok(())
        }

        fn subscribe(&mut self, topic: &str) -> Result<(), Self::Error> {
            if self.fail {
                return Err("offline");
            }
            self.calls.push(BusCall::Subscribe(topic.to_owned()));
            Ok(())
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum LedMode {
        Off,
        Blinking(Duration),
        Steady,
    }

    struct MockLed {
        mode: LedMode,
    }

    impl IndicatorLed for MockLed {
        fn set_blinking(&mut self, interval: Duration) {
            self.mode = LedMode::Blinking(interval);
        }

        fn set_steady(&mut self) {
            self.mode = LedMode::Steady;
        }
    }

    fn link(fail: bool) -> ControlLink<MockBus, MockLed> {
        let bus = MockBus {
            fail,
            ..MockBus::default()
        };
        ControlLink::new(bus, MockLed { mode: LedMode::Off })
    }

    fn expected_calls() -> Vec<BusCall> {
        let publish = |topic: &str, payload: &str| BusCall::Publish(topic.into(), payload.into());
        vec![
            publish("set_rgb", "255,255,255"),
            publish("set_brightness", "100"),
            publish("set", "0"),
            BusCall::Subscribe("set".into()),
            BusCall::Subscribe("set_rgb".into()),
            BusCall::Subscribe("set_brightness".into()),
            BusCall::Subscribe("set_cgamma".into()),
        ]
    }

    #[test]
    fn test_starts_blinking() {
        let link = link(false);
        assert_eq!(
            link.status_led().mode,
            LedMode::Blinking(STATUS_BLINK_INTERVAL)
        );
        assert_eq!(STATUS_BLINK_INTERVAL, Duration::from_millis(500));
        assert!(link.bus().calls.is_empty());
    }

    #[test]
    fn test_connect_announces_and_subscribes() {
        let mut link = link(false);
        link.on_connected();

        assert_eq!(link.status_led().mode, LedMode::Steady);
        assert_eq!(link.bus().calls, expected_calls());
    }

    #[test]
    fn test_reconnect_repeats_announcement() {
        let mut link = link(false);
        link.on_connected();
        link.on_disconnected();
        assert_eq!(
            link.status_led().mode,
            LedMode::Blinking(STATUS_BLINK_INTERVAL)
        );
        link.on_connected();

        let (bus, led) = link.into_parts();
        let mut twice = expected_calls();
        twice.extend(expected_calls());
        assert_eq!(bus.calls, twice);
        assert_eq!(led.mode, LedMode::Steady);
    }

    #[test]
    fn test_bus_failure_is_reported() {
        let mut link = link(true);
        assert_eq!(link.announce(), Err("offline"));

        link.on_connected();
        assert_eq!(link.status_led().mode, LedMode::Steady);
        assert!(link.bus().calls.is_empty());
    }
}
