mod tests {
    use embassy_time::Instant;
    use strip_driver::command::{
        CommandError, ControlCommand, ControlPlaneHandler, parse_decimal_u8,
    };
    use strip_driver::{BlendEngine, LedPixel, LightState};

    fn state() -> LightState {
        LightState::new(BlendEngine::default(), false)
    }

    #[test]
    fn test_parse_set() {
        assert_eq!(
            ControlCommand::parse("set", b"1"),
            Ok(ControlCommand::SetEnabled(true))
        );
        assert_eq!(
            ControlCommand::parse("set", b"0"),
            Ok(ControlCommand::SetEnabled(false))
        );
        assert_eq!(
            ControlCommand::parse("set", b"on"),
            Ok(ControlCommand::SetEnabled(false))
        );
    }

    #[test]
    fn test_parse_rgb() {
        assert_eq!(
            ControlCommand::parse("set_rgb", b"10,20,30"),
            Ok(ControlCommand::SetColor(LedPixel::new(10, 20, 30)))
        );
        assert_eq!(
            ControlCommand::parse("set_rgb", b"10,20"),
            Err(CommandError::MissingSeparator)
        );
        assert_eq!(
            ControlCommand::parse("set_rgb", b"10"),
            Err(CommandError::MissingSeparator)
        );
        assert_eq!(
            ControlCommand::parse("set_rgb", b"10,,30"),
            Err(CommandError::InvalidNumber)
        );
        assert_eq!(
            ControlCommand::parse("set_rgb", b"10,300,30"),
            Err(CommandError::InvalidNumber)
        );
    }

    #[test]
    fn test_parse_brightness_and_gamma() {
        assert_eq!(
            ControlCommand::parse("set_brightness", b"70"),
            Ok(ControlCommand::SetBrightness(70))
        );
        assert_eq!(
            ControlCommand::parse("set_cgamma", b"1"),
            Ok(ControlCommand::SetGamma(true))
        );
        assert_eq!(
            ControlCommand::parse("set_cgamma", b"0"),
            Ok(ControlCommand::SetGamma(false))
        );
    }

    #[test]
    fn test_parse_rejects_empty_and_unknown() {
        assert_eq!(
            ControlCommand::parse("set", b""),
            Err(CommandError::EmptyPayload)
        );
        assert_eq!(
            ControlCommand::parse("rgb_state_topic", b"1"),
            Err(CommandError::UnknownTopic)
        );
    }

    #[test]
    fn test_parse_decimal_u8() {
        assert_eq!(parse_decimal_u8(b"0"), Ok(0));
        assert_eq!(parse_decimal_u8(b"255"), Ok(255));
        assert_eq!(parse_decimal_u8(b"007"), Ok(7));
        assert_eq!(parse_decimal_u8(b"42%"), Ok(42));
        assert_eq!(parse_decimal_u8(b"256"), Err(CommandError::InvalidNumber));
        assert_eq!(parse_decimal_u8(b" 1"), Err(CommandError::InvalidNumber));
        assert_eq!(parse_decimal_u8(b""), Err(CommandError::InvalidNumber));
    }

    #[test]
    fn test_handle_applies_color() {
        let mut state = state();
        let now = Instant::from_millis(10);
        let command = ControlPlaneHandler::handle("set_rgb", b"10,20,30", &mut state, now);

        assert_eq!(command, Ok(ControlCommand::SetColor(LedPixel::new(10, 20, 30))));
        assert_eq!(state.blend().target_color(), LedPixel::new(10, 20, 30));
        assert!(!state.blend().is_settled());
    }

    #[test]
    fn test_malformed_rgb_leaves_state_unchanged() {
        let mut state = state();
        let before = state.blend().clone();
        let result = ControlPlaneHandler::handle("set_rgb", b"10,20", &mut state, Instant::from_millis(10));

        assert_eq!(result, Err(CommandError::MissingSeparator));
        assert_eq!(state.blend().target_color(), before.target_color());
        assert_eq!(state.blend().alpha(), before.alpha());
        assert!(state.blend().is_settled());
    }

    #[test]
    fn test_handle_enable_and_gamma() {
        let mut state = state();
        let now = Instant::from_millis(0);

        ControlPlaneHandler::handle("set", b"1", &mut state, now).unwrap();
        assert!(state.blend().is_enabled());
        assert_eq!(state.blend().target_brightness(), 100);

        ControlPlaneHandler::handle("set_cgamma", b"1", &mut state, now).unwrap();
        assert!(state.gamma());

        ControlPlaneHandler::handle("set_brightness", b"30", &mut state, now).unwrap();
        assert_eq!(state.blend().target_brightness(), 30);
    }
}
