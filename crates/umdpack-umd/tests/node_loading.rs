use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use umdpack_core::{ExportPath, ModuleWrapper, WrapConfig};
use umdpack_umd::UmdWrapper;

const THING: &str = r#"var org = org || {};
org.example = org.example || {};
org.example.Thing = { name: "thing", version: 2 };
var helper = function () { return 1; };
"#;

fn wrap_to_file(dir: &Path, source: &str, export: &str) -> PathBuf {
    let config = WrapConfig {
        source: dir.join("tmp.js"),
        destination: dir.join("thing.js"),
        export: ExportPath::parse(export).unwrap(),
        module_id: "thing".to_string(),
        global_alias: "Thing".to_string(),
    };
    let wrapped = UmdWrapper.wrap(source.as_bytes(), &config).unwrap();
    fs::write(&config.destination, wrapped).unwrap();
    config.destination
}

/// Evaluate `script` with node; the wrapped bundle path is passed as argv[1].
fn run_node(script: &str, bundle: &Path) -> String {
    let output = Command::new("node")
        .args(["-e", script])
        .arg(bundle)
        .output()
        .expect("failed to run node");
    if !output.status.success() {
        panic!(
            "node failed:\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

#[test]
#[ignore] // Requires Node.js installed
fn global_alias_without_loader() {
    let tmp = tempfile::tempdir().unwrap();
    let bundle = wrap_to_file(tmp.path(), THING, "org.example.Thing");

    let script = r#"
const vm = require("vm");
const fs = require("fs");
const sandbox = {};
vm.createContext(sandbox);
vm.runInContext(fs.readFileSync(process.argv[1], "utf8"), sandbox);
console.log(JSON.stringify({ thing: sandbox.Thing, leaked: typeof sandbox.helper }));
"#;
    assert_eq!(
        run_node(script, &bundle),
        r#"{"thing":{"name":"thing","version":2},"leaked":"undefined"}"#
    );
}

#[test]
#[ignore] // Requires Node.js installed
fn amd_loader_registers_module_id() {
    let tmp = tempfile::tempdir().unwrap();
    let bundle = wrap_to_file(tmp.path(), THING, "org.example.Thing");

    let script = r#"
const vm = require("vm");
const fs = require("fs");
const registered = {};
const sandbox = {
    define: function (id, deps, factory) { registered[id] = factory(); }
};
sandbox.define.amd = {};
vm.createContext(sandbox);
vm.runInContext(fs.readFileSync(process.argv[1], "utf8"), sandbox);
console.log(JSON.stringify({ ids: Object.keys(registered), name: registered.thing.name, global: typeof sandbox.Thing }));
"#;
    assert_eq!(
        run_node(script, &bundle),
        r#"{"ids":["thing"],"name":"thing","global":"undefined"}"#
    );
}

#[test]
#[ignore] // Requires Node.js installed
fn commonjs_require_returns_export() {
    let tmp = tempfile::tempdir().unwrap();
    let bundle = wrap_to_file(tmp.path(), THING, "org.example.Thing");

    let script = r#"
const thing = require(process.argv[1]);
console.log(thing.name + "@" + thing.version);
"#;
    assert_eq!(run_node(script, &bundle), "thing@2");
}

/// Require the bundle and print the load error message, if any.
const REQUIRE_MESSAGE: &str = r#"
try {
    require(process.argv[1]);
    console.log("loaded");
} catch (e) {
    console.log(e.message);
}
"#;

#[test]
#[ignore] // Requires Node.js installed
fn undefined_export_throws_on_load() {
    let tmp = tempfile::tempdir().unwrap();
    let bundle = wrap_to_file(tmp.path(), THING, "org.example.Missing");

    assert_eq!(
        run_node(REQUIRE_MESSAGE, &bundle),
        "umdpack: export 'org.example.Missing' is not defined by the bundled code"
    );
}

#[test]
#[ignore] // Requires Node.js installed
fn undefined_intermediate_segment_throws_on_load() {
    let tmp = tempfile::tempdir().unwrap();
    let bundle = wrap_to_file(tmp.path(), THING, "org.missing.Thing");

    assert_eq!(
        run_node(REQUIRE_MESSAGE, &bundle),
        "umdpack: export 'org.missing.Thing' is not defined by the bundled code"
    );
}

#[test]
#[ignore] // Requires Node.js installed
fn undeclared_root_throws_on_load() {
    let tmp = tempfile::tempdir().unwrap();
    let bundle = wrap_to_file(tmp.path(), THING, "nothere.Thing");

    assert_eq!(
        run_node(REQUIRE_MESSAGE, &bundle),
        "umdpack: export 'nothere.Thing' is not defined by the bundled code"
    );
}
