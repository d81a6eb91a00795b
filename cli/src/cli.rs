use api_harness::suite::SuiteKind;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "apiharness")]
#[command(
    author,
    version,
    about = "Test orchestration for multi-tenant HTTP APIs"
)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[clap(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a test suite against an environment and exit with its status
    Run {
        /// Suite to run
        #[clap(value_enum)]
        suite: SuiteArg,

        /// Environment from the configuration file
        #[clap(short, long, default_value = "local")]
        env: String,

        /// Collect coverage (passes --coverage to the suite command)
        #[clap(long, default_value_t = false)]
        coverage: bool,

        /// Write a JSON report after the run
        #[clap(long, default_value_t = false)]
        report: bool,

        /// Directory for reports (defaults to [reports].dir)
        #[clap(long)]
        reports_dir: Option<String>,

        /// Configuration file path
        #[clap(short, long, default_value = "harness.toml")]
        config: String,
    },

    /// Check configured services, optionally waiting until they are healthy
    Health {
        /// Also check `<base_url>/api/health` of this environment as the `api` service
        #[clap(short, long)]
        env: Option<String>,

        /// Poll for up to this many seconds before reporting
        #[clap(short, long)]
        wait: Option<u64>,

        /// Configuration file path
        #[clap(short, long, default_value = "harness.toml")]
        config: String,
    },

    /// Print a composite fixture as JSON
    Fixtures {
        #[clap(value_enum)]
        set: FixtureSet,

        /// Seed for reproducible output
        #[clap(long)]
        seed: Option<u64>,
    },

    /// Generate a default harness.toml
    Init {
        /// Overwrite an existing file
        #[clap(long, default_value_t = false)]
        force: bool,

        /// Configuration file path
        #[clap(short, long, default_value = "harness.toml")]
        config: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuiteArg {
    Unit,
    Integration,
    E2e,
    Load,
    Security,
    Accessibility,
    /// Every suite, one after another
    All,
}

impl From<SuiteArg> for SuiteKind {
    fn from(arg: SuiteArg) -> Self {
        match arg {
            SuiteArg::Unit => SuiteKind::Unit,
            SuiteArg::Integration => SuiteKind::Integration,
            SuiteArg::E2e => SuiteKind::E2e,
            SuiteArg::Load => SuiteKind::Load,
            SuiteArg::Security => SuiteKind::Security,
            SuiteArg::Accessibility => SuiteKind::Accessibility,
            SuiteArg::All => SuiteKind::All,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FixtureSet {
    /// One tenant with a handful of customers, deals and invoices
    SmallBusiness,
    /// One large tenant with users for every role
    Enterprise,
    /// Three tenants with their own data
    MultiTenant,
}
