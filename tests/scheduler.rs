mod tests {
    use embassy_time::{Duration, Instant};
    use strip_driver::frame_scheduler::DEFAULT_TICK_DURATION;
    use strip_driver::{
        FrameSource, LedPixel, OutputDriver, PacketChannel, RenderConfig, RenderLoop,
        TickScheduler,
    };

    #[derive(Default)]
    struct CountingDriver {
        writes: usize,
    }

    impl OutputDriver for CountingDriver {
        fn write(&mut self, _colors: &[LedPixel], _gamma: bool) {
            self.writes += 1;
        }
    }

    #[test]
    fn test_tick_pacing_and_drift_reset() {
        let channel = PacketChannel::<4>::new();
        let render = RenderLoop::<_, 4>::new(CountingDriver::default(), &RenderConfig::default());
        let mut scheduler = TickScheduler::new(render, channel.receiver());

        let result = scheduler.tick(Instant::from_millis(0));
        assert_eq!(result.next_deadline, Instant::from_millis(5));
        assert_eq!(result.sleep_duration, DEFAULT_TICK_DURATION);

        let result = scheduler.tick(Instant::from_millis(1000));
        assert_eq!(result.next_deadline, Instant::from_millis(1005));
        assert_eq!(result.sleep_duration, Duration::from_millis(5));
    }

    #[test]
    fn test_scheduler_streams_queued_datagrams() {
        let channel = PacketChannel::<4>::new();
        let render = RenderLoop::<_, 4>::new(CountingDriver::default(), &RenderConfig::default());
        let mut scheduler = TickScheduler::with_tick_duration(
            render,
            channel.receiver(),
            Duration::from_millis(10),
        );

        channel.sender().try_send(&[1, 3, 10, 20, 30]).unwrap();
        let result = scheduler.tick(Instant::from_millis(0));

        assert_eq!(result.outcome.source, FrameSource::Stream);
        assert!(channel.is_empty());
        assert_eq!(
            scheduler.render_loop().pixels().get(3),
            Some(LedPixel::new(20, 10, 30))
        );
        assert_eq!(scheduler.render_loop().output().writes, 1);

        scheduler
            .render_loop_mut()
            .on_message("set", b"1", Instant::from_millis(5))
            .unwrap();
        let result = scheduler.tick(Instant::from_millis(10));
        assert_eq!(result.outcome.source, FrameSource::Blend);
        assert_eq!(result.sleep_duration, Duration::from_millis(10));
    }
}
