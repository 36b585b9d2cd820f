//! End-to-end runs of the `conflux` binary against a fake synthesizer.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use conflux_assemble::leaf_interface;
use conflux_graph::{ArgCategory, Port};
use serde_json::json;

fn conflux_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_conflux"))
}

/// Pretends to synthesize: copies `{source stem}.json` next to an empty
/// module and logs each run.
const FAKE_SYNTH: &str = r#"while [ $# -gt 0 ]; do
  case "$1" in
    --top) top="$2"; shift ;;
    --source) src="$2"; shift ;;
    --out-dir) out="$2"; shift ;;
  esac
  shift
done
echo "module $top(); endmodule" > "$out/$top.v"
cp "${src%.cpp}.json" "$out/$top.json"
echo "$top" >> "$(dirname "$src")/runs.log"
"#;

/// Two leaves joined by FIFO `f`, with `A_0` and `B_0` in regions X and Y.
fn project(topology: serde_json::Value) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let tool = root.join("synth.sh");
    std::fs::write(&tool, FAKE_SYNTH).unwrap();

    std::fs::write(
        root.join("conflux.toml"),
        format!(
            r#"
[project]
name = "pair"
top = "T"

[device]
part = "xcu250-figd2104-2L-e"
clock_period = "300MHz"

[pipeline]
register_level = 2
strategy = "floorplan"

[synth]
command = "sh"
args = ["{}"]
jobs = 2

[floorplan]
assignment = "floorplan.json"
"#,
            tool.display()
        ),
    )
    .unwrap();

    let graph = json!({
        "top": "T",
        "tasks": {
            "A": {"level": "leaf", "source": "src/a.cpp", "ports": [
                {"name": "o", "category": "ostream", "width": 32}
            ]},
            "B": {"level": "leaf", "source": "src/b.cpp", "ports": [
                {"name": "i", "category": "istream", "width": 32}
            ]},
            "T": {"level": "upper", "instances": {
                "A": [{"args": {"o": {"arg": "f", "category": "ostream"}}}],
                "B": [{"args": {"i": {"arg": "f", "category": "istream"}}}]
            }, "fifos": {"f": {"depth": 8, "producer": ["A", 0], "consumer": ["B", 0]}}}
        }
    });
    std::fs::write(root.join("graph.json"), graph.to_string()).unwrap();

    let src = root.join("src");
    std::fs::create_dir_all(&src).unwrap();
    for (name, port, category) in [("a", "o", ArgCategory::Ostream), ("b", "i", ArgCategory::Istream)] {
        std::fs::write(src.join(format!("{name}.cpp")), format!("void {name}();")).unwrap();
        let ports = leaf_interface(&[Port::new(port, category, 32)]);
        let out = json!({
            "ports": ports,
            "clock_period": 3.0,
            "area": {"bram": 0, "dsp": 0, "ff": 100, "lut": 200, "uram": 0}
        });
        std::fs::write(src.join(format!("{name}.json")), out.to_string()).unwrap();
    }

    std::fs::write(
        root.join("floorplan.json"),
        json!({"assignment": {"X": ["A_0"], "Y": ["B_0"]}, "topology": topology}).to_string(),
    )
    .unwrap();
    dir
}

fn run(root: &Path, args: &[&str]) -> Output {
    Command::new(conflux_binary())
        .current_dir(root)
        .arg("--color")
        .arg("never")
        .args(args)
        .output()
        .expect("failed to run conflux")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn build_produces_netlists_plan_and_archive() {
    let dir = project(json!({"X": {"Y": ["Z"]}}));
    let root = dir.path();
    let out = run(root, &["build"]);
    assert!(out.status.success(), "build failed:\n{}", stderr(&out));
    assert!(stderr(&out).contains("Synthesizing A"));

    let work = root.join("work");
    let top = std::fs::read_to_string(work.join("hdl/T.v")).unwrap();
    assert!(top.contains("relay_station"));
    assert!(top.contains(".LEVEL(3)"));
    assert!(work.join("hdl/A.v").is_file());

    let plan: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(work.join("floorplan.json")).unwrap())
            .unwrap();
    assert_eq!(plan["fifos"]["f"]["stages"], json!(["X", "Z", "Y"]));
    assert_eq!(plan["register_level_bound"], 3);

    let tcl = std::fs::read_to_string(work.join("constraints.tcl")).unwrap();
    assert!(tcl.contains("[get_pblocks Z]"));
    assert!(tcl.contains("f/stage\\[1\\]"));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(work.join("report/T.json")).unwrap())
            .unwrap();
    assert_eq!(report["area"]["breakdown"]["A"]["count"], 1);
    assert!(work.join("pair.cfx").is_file());
}

#[test]
fn unchanged_leaves_are_not_resynthesized() {
    let dir = project(json!({"X": {"Y": []}}));
    let root = dir.path();
    assert!(run(root, &["analyze"]).status.success());
    assert!(run(root, &["synth"]).status.success());
    let again = run(root, &["synth"]);
    assert!(again.status.success(), "{}", stderr(&again));
    assert!(stderr(&again).contains("Fresh A"));

    let log = std::fs::read_to_string(root.join("src/runs.log")).unwrap();
    assert_eq!(log.lines().count(), 2);
}

#[test]
fn unreachable_regions_fail_with_named_pair() {
    let dir = project(json!({"Y": {"X": []}}));
    let out = run(dir.path(), &["build"]);
    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("error[E124]"), "{err}");
    assert!(err.contains("X -> Y"), "{err}");
}

#[test]
fn stage_before_its_input_names_missing_stage() {
    let dir = project(json!({}));
    let out = run(dir.path(), &["link"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("run `analyze` first"));
}
