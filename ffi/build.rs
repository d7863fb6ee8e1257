use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");

    let crate_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string()));
    let include_dir = crate_dir.join("include");
    if let Err(err) = std::fs::create_dir_all(&include_dir) {
        println!("cargo:warning=cannot create {}: {err}", include_dir.display());
        return;
    }

    // A stale or missing header must not break the Rust build.
    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("CATALOG_FFI_H")
        .with_documentation(true)
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(include_dir.join("catalog_ffi.h"));
        }
        Err(err) => println!("cargo:warning=cbindgen failed: {err}"),
    }
}
