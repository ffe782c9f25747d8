use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "vcfrange")]
#[command(about = "Range-keyed variant and genotype service")]
#[command(group(ArgGroup::new("input").required(true).args(["vcf", "json", "remote"])))]
pub struct Config {
    /// Host address to bind to
    #[arg(long, env = "VCFRANGE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "VCFRANGE_PORT", default_value = "8080")]
    pub port: u16,

    /// Public base URL reported at startup (e.g., https://example.com)
    #[arg(long, env = "VCFRANGE_BASE_URL")]
    pub base_url: Option<String>,

    /// VCF file to serve, loaded by range (.vcf or .vcf.gz with optional .tbi/.csi)
    #[arg(long, env = "VCFRANGE_VCF")]
    pub vcf: Option<PathBuf>,

    /// Pre-fetched GA4GH-style JSON payload to serve, loaded eagerly
    #[arg(long, env = "VCFRANGE_JSON")]
    pub json: Option<PathBuf>,

    /// Upstream variant service to proxy, loaded by range
    #[arg(long, env = "VCFRANGE_REMOTE")]
    pub remote: Option<String>,

    /// Timeout for upstream requests, in seconds
    #[arg(long, env = "VCFRANGE_REMOTE_TIMEOUT", default_value = "30")]
    pub remote_timeout: u64,

    /// Enable CORS for all origins
    #[arg(long, env = "VCFRANGE_CORS", default_value = "true")]
    pub cors: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Widest range, in bases, loaded by a single request
    #[arg(long, env = "VCFRANGE_MAX_RANGE_WIDTH", default_value = "10000000")]
    pub max_range_width: u64,
}

impl Config {
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host, self.port))
    }
}
