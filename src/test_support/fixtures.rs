//! Test fixtures: a miniature runtime checkout and the build output a
//! real build of it would leave behind.

use std::fs;
use std::path::Path;

/// Files present in the runtime checkout before any build.
pub const CHECKOUT_FILES: &[(&str, &str)] = &[
    ("src/array.c", "int array;"),
    ("src/value_array.h", "#pragma once"),
    ("include/mruby.h", "#pragma once"),
    ("mrblib/array.rb", "class Array; end"),
    ("mrbgems/mruby-math/mrbgem.rake", "MRuby::Gem::Specification.new"),
    ("mrbgems/mruby-math/src/math.c", "int math;"),
    ("mrbgems/mruby-string-ext/src/string.c", "int string;"),
    ("mrbgems/mruby-unused/src/unused.c", "int unused;"),
];

/// Files a successful build generates, relative to the checkout.
pub const BUILD_OUTPUT_FILES: &[(&str, &str)] = &[
    ("build/host/mrblib/mrblib.c", "int mrblib;"),
    ("build/host/mrbgems/gem_init.c", "int gem_init;"),
    ("build/host/mrbgems/mruby-math/gem_init.c", "int math_init;"),
    ("build/host/mrbgems/mruby-math/gem_math.h", "#pragma once"),
    ("build/host/mrbgems/mruby-string-ext/gem_init.c", "int string_init;"),
    ("build/host/include/mruby/presym/id.h", "#pragma once"),
    ("build/host/include/mruby/presym/table.h", "#pragma once"),
    ("build/host/lib/libmruby.flags.mak", "MRUBY_CFLAGS ="),
];

fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (path, contents) in files {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

/// Write the runtime checkout under `root`.
pub fn write_runtime_checkout(root: &Path) {
    write_files(root, CHECKOUT_FILES);
}

/// Write the build output a successful build would produce under `root`.
pub fn write_build_output(root: &Path) {
    write_files(root, BUILD_OUTPUT_FILES);
}

/// Write a full set of pipeline inputs into `dir` and return their paths
/// as (build config, runtime checkout, supplemental symbols).
pub fn write_inputs(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf, std::path::PathBuf) {
    let runtime = dir.join("mruby");
    write_runtime_checkout(&runtime);
    let config = dir.join("mruby-config.rb");
    fs::write(&config, "MRuby::Build.new { |conf| conf.toolchain }\n").unwrap();
    let presym = dir.join("mruby-presym.txt");
    fs::write(&presym, "bar\na\n").unwrap();
    (config, runtime, presym)
}
