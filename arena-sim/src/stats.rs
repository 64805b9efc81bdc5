/// Rolling 1-second window of tick/LOS wallclock timings, published once a
/// second and broadcast inside every UPDATE frame's stats tail.
/// Publication is driven by wallclock time, not tick count, so it
/// stays meaningful even if the loop falls behind its target rate.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatsSnapshot {
    pub tick_time_ms_avg: f32,
    pub tick_time_ms_per_sec: f32,
    pub los_time_ms_avg: f32,
    pub los_time_ms_per_sec: f32,
}

pub struct RollingStats {
    window_start_millis: u64,
    tick_accum_ms: f32,
    los_accum_ms: f32,
    ticks_in_window: u32,
    last_published: StatsSnapshot,
}

impl RollingStats {
    pub fn new(now_millis: u64) -> Self {
        Self {
            window_start_millis: now_millis,
            tick_accum_ms: 0.0,
            los_accum_ms: 0.0,
            ticks_in_window: 0,
            last_published: StatsSnapshot::default(),
        }
    }

    pub fn record_tick(&mut self, now_millis: u64, tick_time_ms: f32, los_time_ms: f32) {
        self.tick_accum_ms += tick_time_ms;
        self.los_accum_ms += los_time_ms;
        self.ticks_in_window += 1;

        if now_millis.saturating_sub(self.window_start_millis) >= 1000 {
            self.last_published = StatsSnapshot {
                tick_time_ms_avg: self.tick_accum_ms / self.ticks_in_window as f32,
                tick_time_ms_per_sec: self.tick_accum_ms,
                los_time_ms_avg: self.los_accum_ms / self.ticks_in_window as f32,
                los_time_ms_per_sec: self.los_accum_ms,
            };
            self.tick_accum_ms = 0.0;
            self.los_accum_ms = 0.0;
            self.ticks_in_window = 0;
            self.window_start_millis = now_millis;
        }
    }

    pub fn current(&self) -> StatsSnapshot {
        self.last_published
    }
}
