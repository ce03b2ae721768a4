use std::{env, fs, path::PathBuf};

use aya_build::cargo_metadata;
use derive_more::{Display, From};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Display, From)]
#[display("{self:?}")]
pub enum Error {
	#[from(String, &String, &str)]
	Custom(String),
	ExecFail,
	BuildFail,
	#[from]
	Io(std::io::Error),
}

fn main() -> Result<()> {
	// Without the BPF linker only the host crates can be built. Leave an empty
	// object behind so the loader still compiles and reports it at startup.
	if let Err(err) = which::which("bpf-linker") {
		let out_dir = env::var_os("OUT_DIR").map(PathBuf::from).ok_or("OUT_DIR not set")?;
		println!("cargo:warning=bpf-linker not found ({err}), skipping kestrel-ebpf");
		fs::write(out_dir.join("kestrel"), [])?;
		return Ok(());
	}

	let cargo_metadata::Metadata { packages, .. } = cargo_metadata::MetadataCommand::new()
		.no_deps()
		.exec()
		.map_err(|_| Error::ExecFail)?;
	let ebpf_package = packages
		.into_iter()
		.find(|cargo_metadata::Package { name, .. }| name == "kestrel-ebpf")
		.ok_or("kestrel-ebpf package not found")?;
	aya_build::build_ebpf([ebpf_package]).map_err(|_| Error::BuildFail)?;
	Ok(())
}
