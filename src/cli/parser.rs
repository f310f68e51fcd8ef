use crate::services::ServiceConfig;
use clap::{ArgAction, CommandFactory, FromArgMatches, Parser};

const VERSION_INFO: &str = env!("C2_BUILD_VERSION");
const NO_VERIFY_SSL: &str = "--no-verify-ssl";

#[derive(Parser, Debug)]
#[command(about = "Command line client for CROC Cloud services", long_about = None, version = VERSION_INFO)]
pub struct Cli {
    /// API action, e.g. DescribeInstances or describe_instances
    pub action: String,

    /// Do not verify the endpoint's TLS certificate
    #[arg(long)]
    pub no_verify_ssl: bool,

    /// Increase message verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Action parameters as `key value` pairs, e.g. Filter.1.Name instance-type
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "KEY VALUE")]
    pub parameters: Vec<String>,
}

impl Cli {
    /// Parses `args` for `service`, using its program name in help and errors.
    pub fn parse_for<I, T>(service: &ServiceConfig, args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let command = Cli::command().name(service.program).bin_name(service.program);
        let matches = command.try_get_matches_from(args)?;
        let mut cli = Cli::from_arg_matches(&matches)?;
        cli.extract_flags();
        Ok(cli)
    }

    /// `--no-verify-ssl` may also appear after the action, in a key position.
    fn extract_flags(&mut self) {
        let mut parameters = Vec::with_capacity(self.parameters.len());
        let mut rest = std::mem::take(&mut self.parameters).into_iter();
        while let Some(key) = rest.next() {
            if key == NO_VERIFY_SSL {
                self.no_verify_ssl = true;
                continue;
            }
            parameters.push(key);
            if let Some(value) = rest.next() {
                parameters.push(value);
            }
        }
        self.parameters = parameters;
    }
}
