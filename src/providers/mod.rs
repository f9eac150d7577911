pub mod carbon;
pub mod geolocation;
pub mod tdp;

use std::time::Duration;

pub use carbon::{CarbonIntensityProvider, CarbonIntensityReport, Co2SignalClient, Zone};
pub use geolocation::{Geolocation, IpGeolocationClient, LocationProvider};
pub use tdp::{CpuVendor, JsonFileCache, JsonTdpDatabase, TdpCache, TdpRecord, TdpResolver, TdpSource};

pub(crate) fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(5))
        .timeout_read(Duration::from_secs(10))
        .build()
}
