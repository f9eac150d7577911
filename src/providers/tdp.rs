use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::util::contains_ignore_ascii_case;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CpuVendor {
    Intel,
    Amd,
}

impl CpuVendor {
    pub fn detect(cpu_name: &str) -> Result<Self> {
        if cpu_name.trim().is_empty() {
            return Err(Error::invalid_argument("cpu name must not be empty"));
        }
        if contains_ignore_ascii_case(cpu_name, "intel") {
            Ok(CpuVendor::Intel)
        } else if contains_ignore_ascii_case(cpu_name, "amd") {
            Ok(CpuVendor::Amd)
        } else {
            Err(Error::not_supported(format!("cpu vendor of '{cpu_name}' is not supported")))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CpuVendor::Intel => "Intel",
            CpuVendor::Amd => "AMD",
        }
    }
}

/// Normalized model code of a CPU name: a run of digits plus the letters and
/// digits that follow it. When several candidates exist the one with the
/// longest digit run wins, so "i7-8569U CPU @ 2.80GHz" yields "8569U".
pub fn model_code(cpu_name: &str) -> Option<String> {
    let chars: Vec<char> = cpu_name.chars().collect();
    let mut best: Option<(usize, String)> = None;
    let mut i = 0;
    while i < chars.len() {
        if !chars[i].is_ascii_digit() || (i > 0 && chars[i - 1].is_ascii_digit()) {
            i += 1;
            continue;
        }
        let digits = chars[i..].iter().take_while(|c| c.is_ascii_digit()).count();
        let len = chars[i..]
            .iter()
            .take_while(|c| c.is_ascii_alphanumeric())
            .count();
        let code: String = chars[i..i + len].iter().collect::<String>().to_ascii_uppercase();
        if best.as_ref().map_or(true, |(longest, _)| digits > *longest) {
            best = Some((digits, code));
        }
        i += len.max(1);
    }
    best.map(|(_, code)| code)
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TdpRecord {
    pub model: String,
    #[serde(alias = "tdp_watts")]
    pub tdp: f64,
    #[serde(default)]
    pub vendor: Option<String>,
}

impl TdpRecord {
    /// Uses the explicit `vendor` field when present, else the vendor named in
    /// the model string. Records naming neither are kept.
    pub fn is_from(&self, vendor: CpuVendor) -> bool {
        match &self.vendor {
            Some(name) => name.trim().eq_ignore_ascii_case(vendor.as_str()),
            None => CpuVendor::detect(&self.model).map_or(true, |v| v == vendor),
        }
    }
}

/// Exactly one record must share the CPU's model code.
pub fn resolve_unique(cpu_name: &str, records: &[TdpRecord]) -> Result<f64> {
    let code = model_code(cpu_name)
        .ok_or_else(|| Error::not_supported(format!("no model code in cpu name '{cpu_name}'")))?;
    let matches: Vec<&TdpRecord> = records
        .iter()
        .filter(|r| model_code(&r.model).as_deref() == Some(code.as_str()))
        .collect();
    match matches.as_slice() {
        [record] if record.tdp > 0.0 => Ok(record.tdp),
        [record] => Err(Error::not_supported(format!(
            "TDP record for '{}' is not positive ({})",
            record.model, record.tdp
        ))),
        [] => Err(Error::not_supported(format!("no TDP record for model code '{code}'"))),
        many => Err(Error::not_supported(format!(
            "model code '{code}' is ambiguous: {} TDP records match",
            many.len()
        ))),
    }
}

/// Where TDP records come from when the cache misses. Only records of
/// `vendor` are returned.
pub trait TdpSource {
    fn records(&self, vendor: CpuVendor) -> Result<Vec<TdpRecord>>;
}

/// Local JSON database: an array of `{"model": ..., "tdp": ...}` objects.
pub struct JsonTdpDatabase {
    path: PathBuf,
}

impl JsonTdpDatabase {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TdpSource for JsonTdpDatabase {
    fn records(&self, vendor: CpuVendor) -> Result<Vec<TdpRecord>> {
        let raw = fs::read_to_string(&self.path).map_err(|e| Error::storage(&self.path, e))?;
        let records: Vec<TdpRecord> = serde_json::from_str(&raw).map_err(|e| {
            Error::not_supported(format!(
                "TDP database {} is malformed: {e}",
                self.path.display()
            ))
        })?;
        Ok(records.into_iter().filter(|r| r.is_from(vendor)).collect())
    }
}

/// No database configured: only cache hits can resolve.
impl<T: TdpSource> TdpSource for Option<T> {
    fn records(&self, vendor: CpuVendor) -> Result<Vec<TdpRecord>> {
        match self {
            Some(source) => source.records(vendor),
            None => Err(Error::not_supported(
                "no TDP database configured; set functional.cpu_tdp_watts or functional.tdp_database",
            )),
        }
    }
}

/// Key-value store of resolved TDPs keyed by model code.
pub trait TdpCache {
    fn get(&self, code: &str) -> Option<f64>;
    fn put(&mut self, code: &str, tdp_watts: f64) -> Result<()>;
}

impl TdpCache for HashMap<String, f64> {
    fn get(&self, code: &str) -> Option<f64> {
        HashMap::get(self, code).copied()
    }

    fn put(&mut self, code: &str, tdp_watts: f64) -> Result<()> {
        self.insert(code.to_string(), tdp_watts);
        Ok(())
    }
}

/// Cache persisted as a JSON object of code to watts.
pub struct JsonFileCache {
    path: PathBuf,
    entries: HashMap<String, f64>,
}

impl JsonFileCache {
    /// A missing or unreadable file starts an empty cache.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TdpCache for JsonFileCache {
    fn get(&self, code: &str) -> Option<f64> {
        self.entries.get(code).copied()
    }

    fn put(&mut self, code: &str, tdp_watts: f64) -> Result<()> {
        self.entries.insert(code.to_string(), tdp_watts);
        let body = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| Error::storage(&self.path, e.into()))?;
        fs::write(&self.path, body).map_err(|e| Error::storage(&self.path, e))
    }
}

pub struct TdpResolver<C, D> {
    cache: C,
    source: D,
}

impl<C: TdpCache, D: TdpSource> TdpResolver<C, D> {
    pub fn new(cache: C, source: D) -> Self {
        Self { cache, source }
    }

    pub fn resolve(&mut self, cpu_name: &str) -> Result<f64> {
        let vendor = CpuVendor::detect(cpu_name)?;
        let code = model_code(cpu_name)
            .ok_or_else(|| Error::not_supported(format!("no model code in cpu name '{cpu_name}'")))?;

        if let Some(tdp) = self.cache.get(&code) {
            debug!(code = %code, tdp, "TDP cache hit");
            return Ok(tdp);
        }

        let records = self.source.records(vendor)?;
        let tdp = resolve_unique(cpu_name, &records)?;
        info!(vendor = vendor.as_str(), code = %code, tdp, "resolved CPU TDP");
        self.cache.put(&code, tdp)?;
        Ok(tdp)
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn record(model: &str, tdp: f64) -> TdpRecord {
        TdpRecord {
            model: model.to_string(),
            tdp,
            vendor: None,
        }
    }

    #[test]
    fn extracts_model_codes() {
        assert_eq!(
            model_code("Intel(R) Core(TM) i7-8569U CPU @ 2.80GHz").as_deref(),
            Some("8569U")
        );
        assert_eq!(
            model_code("AMD Ryzen 7 5700U with Radeon Graphics").as_deref(),
            Some("5700U")
        );
        assert_eq!(model_code("AMD Ryzen™ 9 7950X3D").as_deref(), Some("7950X3D"));
        assert_eq!(model_code("Apple M-series"), None);
    }

    #[test]
    fn detects_supported_vendors() {
        assert_eq!(CpuVendor::detect("Intel(R) Xeon(R) Gold 6230").unwrap(), CpuVendor::Intel);
        assert_eq!(CpuVendor::detect("AMD EPYC 7763").unwrap(), CpuVendor::Amd);
        assert!(matches!(CpuVendor::detect("Apple M2"), Err(Error::NotSupported(_))));
        assert!(matches!(CpuVendor::detect(""), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn single_match_resolves() {
        let db = vec![record("AMD Ryzen 7 5700U", 15.0), record("AMD Ryzen 7 5800X", 105.0)];
        assert_eq!(resolve_unique("AMD Ryzen 7 5700U with Radeon Graphics", &db).unwrap(), 15.0);
    }

    #[test]
    fn zero_or_many_matches_are_not_supported() {
        let db = vec![record("AMD Ryzen 7 5800X", 105.0)];
        assert!(matches!(
            resolve_unique("AMD Ryzen 7 5700U", &db),
            Err(Error::NotSupported(_))
        ));

        let db = vec![record("AMD Ryzen 7 5700U", 15.0), record("AMD Ryzen 5700U Pro", 25.0)];
        let err = resolve_unique("AMD Ryzen 7 5700U", &db).unwrap_err();
        assert!(err.to_string().contains("ambiguous"), "{err}");
    }

    struct CountingSource {
        records: Vec<TdpRecord>,
        calls: Cell<usize>,
    }

    impl TdpSource for &CountingSource {
        fn records(&self, _vendor: CpuVendor) -> Result<Vec<TdpRecord>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.records.clone())
        }
    }

    #[test]
    fn cache_hits_skip_the_source() {
        let source = CountingSource {
            records: vec![record("Intel Core i7-8569U", 28.0)],
            calls: Cell::new(0),
        };
        let mut resolver = TdpResolver::new(HashMap::new(), &source);
        let name = "Intel(R) Core(TM) i7-8569U CPU @ 2.80GHz";
        assert_eq!(resolver.resolve(name).unwrap(), 28.0);
        assert_eq!(resolver.resolve(name).unwrap(), 28.0);
        assert_eq!(source.calls.get(), 1);
        assert_eq!(TdpCache::get(resolver.cache(), "8569U"), Some(28.0));
    }

    #[test]
    fn missing_database_only_serves_cache_hits() {
        let mut cache = HashMap::new();
        cache.insert("8569U".to_string(), 28.0);
        let mut resolver = TdpResolver::new(cache, None::<JsonTdpDatabase>);
        assert_eq!(resolver.resolve("Intel(R) Core(TM) i7-8569U").unwrap(), 28.0);
        assert!(matches!(
            resolver.resolve("Intel(R) Core(TM) i5-1135G7"),
            Err(Error::NotSupported(_))
        ));
    }

    #[test]
    fn json_database_and_cache_files() {
        let dir = std::env::temp_dir().join(format!("energymon-tdp-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let db_path = dir.join("tdp.json");
        fs::write(
            &db_path,
            r#"[{"model": "AMD Ryzen 7 5700U", "tdp": 15}, {"model": "AMD Ryzen 9 7950X", "tdp_watts": 170}]"#,
        )
        .unwrap();
        let cache_path = dir.join("cpu_tdp.json");

        let mut resolver =
            TdpResolver::new(JsonFileCache::open(&cache_path), JsonTdpDatabase::new(&db_path));
        assert_eq!(resolver.resolve("AMD Ryzen 9 7950X 16-Core Processor").unwrap(), 170.0);

        let reopened = JsonFileCache::open(&cache_path);
        assert_eq!(reopened.get("7950X"), Some(170.0));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn database_keeps_only_the_cpu_vendor() {
        let dir = std::env::temp_dir().join(format!("energymon-tdp-vendor-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let db_path = dir.join("tdp.json");
        fs::write(
            &db_path,
            r#"[
                {"model": "Intel Pentium Gold G5600", "tdp": 54},
                {"model": "Ryzen 5 5600", "tdp": 65, "vendor": "amd"},
                {"model": "Core i7-8569U", "tdp": 28, "vendor": "Intel"}
            ]"#,
        )
        .unwrap();
        let db = JsonTdpDatabase::new(&db_path);

        let amd = db.records(CpuVendor::Amd).unwrap();
        assert_eq!(amd.len(), 1);
        assert_eq!(amd[0].model, "Ryzen 5 5600");
        assert_eq!(db.records(CpuVendor::Intel).unwrap().len(), 2);

        // Both records share the code 5600; the vendor filter disambiguates.
        let mut resolver = TdpResolver::new(HashMap::new(), db);
        assert_eq!(resolver.resolve("AMD Ryzen 5 5600 6-Core Processor").unwrap(), 65.0);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unsupported_vendor_fails_before_lookup() {
        let source = CountingSource {
            records: Vec::new(),
            calls: Cell::new(0),
        };
        let mut resolver = TdpResolver::new(HashMap::new(), &source);
        assert!(matches!(resolver.resolve("Apple M2 Pro"), Err(Error::NotSupported(_))));
        assert_eq!(source.calls.get(), 0);
    }
}
