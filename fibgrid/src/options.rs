/// Default idle lifespan of pooled views.
pub const DEFAULT_IDLE_LIFESPAN_MS: u64 = 20_000;

/// Default window used to coalesce reload/invalidate requests.
pub const DEFAULT_COALESCE_DELAY_MS: u64 = 16;

/// Configuration for [`crate::ReuseManager`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReuseOptions {
    /// When disabled, queued views are dropped instead of pooled.
    pub enabled: bool,
    /// Idle time after the last `queue()` before every pooled view is released.
    pub idle_lifespan_ms: u64,
    /// Extra views created the first time a view type is requested.
    pub prewarm_count: usize,
}

impl Default for ReuseOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            idle_lifespan_ms: DEFAULT_IDLE_LIFESPAN_MS,
            prewarm_count: 0,
        }
    }
}

impl ReuseOptions {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_idle_lifespan_ms(mut self, idle_lifespan_ms: u64) -> Self {
        self.idle_lifespan_ms = idle_lifespan_ms;
        self
    }

    pub fn with_prewarm_count(mut self, prewarm_count: usize) -> Self {
        self.prewarm_count = prewarm_count;
        self
    }
}

/// Configuration for [`crate::Grid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridOptions {
    /// Requests arriving within this window of each other collapse into one pass.
    pub coalesce_delay_ms: u64,
    /// Keep the first visible item at the same on-screen position across reloads.
    pub anchor_on_reload: bool,
    /// Options for the grid's own pool. Ignored when the grid shares a pool.
    pub reuse: ReuseOptions,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            coalesce_delay_ms: DEFAULT_COALESCE_DELAY_MS,
            anchor_on_reload: true,
            reuse: ReuseOptions::default(),
        }
    }
}

impl GridOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coalesce_delay_ms(mut self, coalesce_delay_ms: u64) -> Self {
        self.coalesce_delay_ms = coalesce_delay_ms;
        self
    }

    pub fn with_anchor_on_reload(mut self, anchor_on_reload: bool) -> Self {
        self.anchor_on_reload = anchor_on_reload;
        self
    }

    pub fn with_reuse(mut self, reuse: ReuseOptions) -> Self {
        self.reuse = reuse;
        self
    }
}
