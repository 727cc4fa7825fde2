mod tests {
    use strip_driver::{GAMMA8, GammaTable, gamma8};

    #[test]
    fn test_gamma_table_shape() {
        assert_eq!(GAMMA8[0], 0);
        assert_eq!(GAMMA8[255], 255);
        assert!(GAMMA8.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!((1..255).all(|value| GAMMA8[value] <= value as u8));
    }

    #[test]
    fn test_gamma8() {
        assert_eq!(gamma8(128), 37);
        assert_eq!(gamma8(64), 5);
    }

    #[test]
    fn test_gamma_table_apply() {
        assert_eq!(GammaTable::from_enabled(false), GammaTable::Identity);
        assert_eq!(GammaTable::from_enabled(true), GammaTable::Ws2812);
        assert_eq!(GammaTable::Identity.apply(128), 128);
        assert_eq!(GammaTable::Ws2812.apply(128), gamma8(128));
    }
}
