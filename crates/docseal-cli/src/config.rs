//! TOML configuration for the `docseal` binary.
//!
//! ```toml
//! [store]
//! backend = "sqlite"
//! path = "docseal.db"
//!
//! [content_store]
//! backend = "ipfs"
//! url = "http://127.0.0.1:5001"
//!
//! [ledger]
//! backend = "rpc"
//! url = "http://127.0.0.1:8545"
//! contract = "0x5fbdb2315678afecb367f032d93f642f64180aa3"
//! account = "0x00a329c0648769a73afac7f9381e08fb43dbea72"
//!
//! [reporting]
//! backend = "http"
//! attestation_url = "http://127.0.0.1:8000/api/attested"
//! verification_url = "http://127.0.0.1:8000/api/verified"
//!
//! [attestation]
//! function = "addDocument(string)"
//!
//! [codec]
//! signatures = ["transfer(address,uint256)"]
//! ```
//!
//! Every section is optional. The defaults wire in-memory gateways and log
//! reports, which is enough for a dry run. A `sqlite` store is refused next to
//! in-memory gateways unless `[store] allow_ephemeral_gateways = true`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use docseal::core::{Canonicalizer, FunctionSignature, PayloadFormat};
use docseal::gateway::{
    ContentStore, HttpReportSink, IpfsContentStore, JsonRpcLedger, Ledger, LogSink,
    MemoryContentStore, MemoryLedger, ReportSink, ResourceBudget, SignerContext,
};
use docseal::store::{CorrelationStore, MemoryStore, SqliteStore};
use docseal::{Gateways, Kernel, OrchestratorConfig};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub store: StoreConfig,
    pub content_store: ContentStoreConfig,
    pub ledger: LedgerConfig,
    pub reporting: ReportingConfig,
    pub attestation: AttestationConfig,
    pub codec: CodecConfig,
}

// ─────────────────────────────────────────────────────────────────────────────
// Sections
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub path: Option<PathBuf>,
    /// Permit a durable store alongside in-memory gateways. Records written
    /// this way point at content and transactions that vanish on exit.
    pub allow_ephemeral_gateways: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentBackend {
    #[default]
    Memory,
    Ipfs,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentStoreConfig {
    pub backend: ContentBackend,
    /// IPFS HTTP API base URL.
    pub url: Option<String>,
    pub timeout_secs: u64,
    /// Chunk size for the memory backend.
    pub chunk_size: Option<usize>,
}

impl Default for ContentStoreConfig {
    fn default() -> Self {
        Self {
            backend: ContentBackend::default(),
            url: None,
            timeout_secs: default_timeout(),
            chunk_size: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    #[default]
    Memory,
    Rpc,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    pub backend: LedgerBackend,
    /// JSON-RPC endpoint.
    pub url: Option<String>,
    /// Contract receiving attestation calls.
    pub contract: Option<String>,
    /// Sending account.
    pub account: String,
    pub gas_limit: u64,
    /// Wei per gas. Omit to use the node's current price.
    pub gas_price: Option<u64>,
    pub timeout_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            backend: LedgerBackend::default(),
            url: None,
            contract: None,
            account: String::new(),
            gas_limit: ResourceBudget::default().gas_limit,
            gas_price: None,
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportingBackend {
    #[default]
    Log,
    Http,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportingConfig {
    pub backend: ReportingBackend,
    pub attestation_url: Option<String>,
    pub verification_url: Option<String>,
    /// Sent verbatim as the `Authorization` header.
    pub authorization: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            backend: ReportingBackend::default(),
            attestation_url: None,
            verification_url: None,
            authorization: None,
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AttestationConfig {
    pub function: FunctionSignature,
    pub content_param: usize,
    pub identity_field: String,
    pub owner_field: String,
    /// An empty string disables the claim field.
    pub claim_field: String,
    pub volatile_fields: Vec<String>,
    pub format: PayloadFormat,
    pub max_in_flight: usize,
}

impl Default for AttestationConfig {
    fn default() -> Self {
        let orchestrator = OrchestratorConfig::default();
        let canon = orchestrator.canonicalizer;
        Self {
            function: orchestrator.attest_function,
            content_param: orchestrator.content_param,
            identity_field: canon.identity_field,
            owner_field: canon.owner_field,
            claim_field: canon.claim_field.unwrap_or_default(),
            volatile_fields: canon.volatile_fields.into_iter().collect(),
            format: canon.format,
            max_in_flight: orchestrator.max_in_flight,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// Extra signatures recognized when decoding transactions.
    pub signatures: Vec<FunctionSignature>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Loading and wiring
// ─────────────────────────────────────────────────────────────────────────────

impl CliConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Load `path` if given; otherwise `docseal.toml` if present, else defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let fallback = Path::new("docseal.toml");
        if fallback.exists() {
            return Self::load(fallback);
        }
        tracing::debug!("no config file, using in-memory defaults");
        Ok(Self::default())
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check backend-specific settings are present.
    pub fn validate(&self) -> Result<()> {
        if self.store.backend == StoreBackend::Sqlite {
            if self.store.path.is_none() {
                bail!("[store] backend \"sqlite\" requires `path`");
            }
            let ephemeral = self.content_store.backend == ContentBackend::Memory
                || self.ledger.backend == LedgerBackend::Memory;
            if ephemeral && !self.store.allow_ephemeral_gateways {
                bail!(
                    "[store] backend \"sqlite\" needs durable gateways: configure \
                     [content_store] \"ipfs\" and [ledger] \"rpc\", or set \
                     `allow_ephemeral_gateways = true`"
                );
            }
        }
        if self.content_store.backend == ContentBackend::Ipfs && self.content_store.url.is_none()
        {
            bail!("[content_store] backend \"ipfs\" requires `url`");
        }
        if self.ledger.backend == LedgerBackend::Rpc {
            if self.ledger.url.is_none() {
                bail!("[ledger] backend \"rpc\" requires `url`");
            }
            if self.ledger.contract.is_none() {
                bail!("[ledger] backend \"rpc\" requires `contract`");
            }
            if self.ledger.account.is_empty() {
                bail!("[ledger] backend \"rpc\" requires `account`");
            }
        }
        if self.reporting.backend == ReportingBackend::Http
            && (self.reporting.attestation_url.is_none()
                || self.reporting.verification_url.is_none())
        {
            bail!(
                "[reporting] backend \"http\" requires `attestation_url` and `verification_url`"
            );
        }

        self.orchestrator_config().validate()?;
        Ok(())
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        let a = &self.attestation;
        let canonicalizer = Canonicalizer {
            identity_field: a.identity_field.clone(),
            owner_field: a.owner_field.clone(),
            claim_field: Some(a.claim_field.clone()).filter(|f| !f.is_empty()),
            volatile_fields: a.volatile_fields.iter().cloned().collect(),
            format: a.format,
        };

        // The memory ledger needs some sending account.
        let account =
            if self.ledger.account.is_empty() && self.ledger.backend == LedgerBackend::Memory {
                "0x0000000000000000000000000000000000000000".to_string()
            } else {
                self.ledger.account.clone()
            };

        OrchestratorConfig {
            attest_function: a.function.clone(),
            content_param: a.content_param,
            signatures: self.codec.signatures.clone(),
            canonicalizer,
            signer: SignerContext::new(account).with_budget(ResourceBudget {
                gas_limit: self.ledger.gas_limit,
                gas_price: self.ledger.gas_price.map(u128::from),
            }),
            max_in_flight: a.max_in_flight,
        }
    }

    pub fn open_store(&self) -> Result<Arc<dyn CorrelationStore>> {
        Ok(match (self.store.backend, &self.store.path) {
            (StoreBackend::Sqlite, Some(path)) => {
                Arc::new(SqliteStore::open(path).with_context(|| {
                    format!("failed to open correlation store {}", path.display())
                })?)
            }
            (StoreBackend::Sqlite, None) => bail!("[store] backend \"sqlite\" requires `path`"),
            (StoreBackend::Memory, _) => Arc::new(MemoryStore::new()),
        })
    }

    pub fn gateways(&self) -> Result<Gateways> {
        let content: Arc<dyn ContentStore> = match self.content_store.backend {
            ContentBackend::Memory => Arc::new(match self.content_store.chunk_size {
                Some(size) => MemoryContentStore::with_chunk_size(size),
                None => MemoryContentStore::new(),
            }),
            ContentBackend::Ipfs => Arc::new(IpfsContentStore::new(
                self.content_store.url.clone().unwrap_or_default(),
                Duration::from_secs(self.content_store.timeout_secs),
            )?),
        };

        let ledger: Arc<dyn Ledger> = match self.ledger.backend {
            LedgerBackend::Memory => Arc::new(MemoryLedger::new()),
            LedgerBackend::Rpc => Arc::new(JsonRpcLedger::new(
                self.ledger.url.clone().unwrap_or_default(),
                self.ledger.contract.clone().unwrap_or_default(),
                Duration::from_secs(self.ledger.timeout_secs),
            )?),
        };

        let sink: Arc<dyn ReportSink> = match self.reporting.backend {
            ReportingBackend::Log => Arc::new(LogSink),
            ReportingBackend::Http => {
                let sink = HttpReportSink::new(
                    self.reporting.attestation_url.clone().unwrap_or_default(),
                    self.reporting.verification_url.clone().unwrap_or_default(),
                    Duration::from_secs(self.reporting.timeout_secs),
                )?;
                match &self.reporting.authorization {
                    Some(auth) => Arc::new(sink.with_authorization(auth.clone())),
                    None => Arc::new(sink),
                }
            }
        };

        Ok(Gateways { content, ledger, sink })
    }

    pub fn build_kernel(&self) -> Result<Kernel> {
        Ok(Kernel::new(self.orchestrator_config(), self.open_store()?, self.gateways()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_a_dry_run() {
        let config = CliConfig::parse("").unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.ledger.backend, LedgerBackend::Memory);
        assert_eq!(config.reporting.backend, ReportingBackend::Log);

        let orchestrator = config.orchestrator_config();
        assert_eq!(
            orchestrator,
            OrchestratorConfig {
                signer: orchestrator.signer.clone(),
                ..OrchestratorConfig::default()
            }
        );
        assert!(!orchestrator.signer.account.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = CliConfig::parse(
            r#"
            [store]
            backend = "sqlite"
            path = "/var/lib/docseal/correlations.db"

            [content_store]
            backend = "ipfs"
            url = "http://127.0.0.1:5001"
            timeout_secs = 10

            [ledger]
            backend = "rpc"
            url = "http://127.0.0.1:8545"
            contract = "0x5fbdb2315678afecb367f032d93f642f64180aa3"
            account = "0x00a329c0648769a73afac7f9381e08fb43dbea72"
            gas_limit = 500000
            gas_price = 20000000000

            [reporting]
            backend = "http"
            attestation_url = "http://127.0.0.1:8000/attested"
            verification_url = "http://127.0.0.1:8000/verified"
            authorization = "token key:secret"

            [attestation]
            function = "register(uint256, string cid)"
            content_param = 1
            claim_field = ""
            volatile_fields = ["photo"]
            format = "cbor"

            [codec]
            signatures = ["transfer(address,uint256)"]
            "#,
        )
        .unwrap();

        let orchestrator = config.orchestrator_config();
        assert_eq!(orchestrator.attest_function.canonical(), "register(uint256,string)");
        assert_eq!(orchestrator.canonicalizer.claim_field, None);
        assert!(orchestrator.canonicalizer.is_volatile("photo"));
        assert_eq!(orchestrator.canonicalizer.format, PayloadFormat::Cbor);
        assert_eq!(orchestrator.signer.budget.gas_limit, 500_000);
        assert_eq!(orchestrator.signer.budget.gas_price, Some(20_000_000_000));
        assert_eq!(orchestrator.catalog().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_backend_settings() {
        for (toml, needle) in [
            ("[store]\nbackend = \"sqlite\"", "path"),
            ("[content_store]\nbackend = \"ipfs\"", "url"),
            ("[ledger]\nbackend = \"rpc\"\nurl = \"http://x\"", "contract"),
            ("[reporting]\nbackend = \"http\"", "attestation_url"),
        ] {
            let err = CliConfig::parse(toml).unwrap_err();
            assert!(err.to_string().contains(needle), "{}: {}", toml, err);
        }
    }

    #[test]
    fn test_durable_store_needs_durable_gateways() {
        let err = CliConfig::parse("[store]\nbackend = \"sqlite\"\npath = \"c.db\"").unwrap_err();
        assert!(err.to_string().contains("allow_ephemeral_gateways"), "{}", err);

        // A durable ledger alone is not enough while content stays in memory.
        let err = CliConfig::parse(
            r#"
            [store]
            backend = "sqlite"
            path = "c.db"

            [ledger]
            backend = "rpc"
            url = "http://127.0.0.1:8545"
            contract = "0x5fbdb2315678afecb367f032d93f642f64180aa3"
            account = "0x00a329c0648769a73afac7f9381e08fb43dbea72"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("ipfs"), "{}", err);

        let config = CliConfig::parse(
            "[store]\nbackend = \"sqlite\"\npath = \"c.db\"\nallow_ephemeral_gateways = true",
        )
        .unwrap();
        assert!(config.store.allow_ephemeral_gateways);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(CliConfig::parse("[store]\nbackend = \"memory\"\ncolour = \"blue\"").is_err());
        assert!(CliConfig::parse("[ledger]\nbackend = \"carrier-pigeon\"").is_err());
    }

    #[test]
    fn test_orchestrator_rules_apply() {
        let err =
            CliConfig::parse("[attestation]\nfunction = \"addDocument(uint256)\"").unwrap_err();
        assert!(err.to_string().contains("string"), "{}", err);
    }

    #[test]
    fn test_sqlite_store_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("docseal.db");
        let config = CliConfig::parse(&format!(
            "[store]\nbackend = \"sqlite\"\npath = {:?}\nallow_ephemeral_gateways = true",
            path.display().to_string()
        ))
        .unwrap();
        assert!(config.build_kernel().is_ok());
        assert!(path.exists());
    }
}
