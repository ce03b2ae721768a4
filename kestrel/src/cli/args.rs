use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "kestrel", about = "Trace bind(2) calls host-wide")]
pub struct Cli {
	/// Seconds between probe trigger reports, 0 disables them.
	#[arg(long, default_value_t = 10)]
	pub stats_interval: u64,

	/// Kernel symbol the entry and return probes attach to.
	#[arg(long, default_value = "__x64_sys_bind")]
	pub attach_symbol: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn args_defaults() {
		let cli = Cli::parse_from(["kestrel"]);
		assert_eq!(cli.stats_interval, 10);
		assert_eq!(cli.attach_symbol, "__x64_sys_bind");
	}

	#[test]
	fn args_overrides() {
		let cli = Cli::parse_from(["kestrel", "--stats-interval", "0", "--attach-symbol", "__arm64_sys_bind"]);
		assert_eq!(cli.stats_interval, 0);
		assert_eq!(cli.attach_symbol, "__arm64_sys_bind");
	}
}
