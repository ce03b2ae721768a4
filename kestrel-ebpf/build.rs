use which::which;

/// Rebuild the object whenever the linker that produced it changes.
fn main() {
	match which("bpf-linker") {
		Ok(bpf_linker) => println!("cargo:rerun-if-changed={}", bpf_linker.display()),
		Err(err) => println!("cargo:warning=bpf-linker not found: {err}"),
	}
}
