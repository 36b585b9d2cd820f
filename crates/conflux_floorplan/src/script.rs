//! Region-constraint script for downstream physical implementation.

use crate::plan::Floorplan;
use crate::region::Region;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Renders one `add_cells_to_pblock` command per region.
///
/// Each region lists its instances with their controller state registers
/// and the FIFO stages placed there. Output depends only on the plan.
pub fn region_script(plan: &Floorplan) -> String {
    let mut cells: BTreeMap<&Region, Vec<String>> = BTreeMap::new();
    for (region, instances) in plan.assignment.regions() {
        let entry = cells.entry(region).or_default();
        for inst in instances {
            entry.push(inst.clone());
            entry.push(format!("{inst}__state.*"));
        }
    }
    for (fifo, fp) in &plan.fifos {
        for (i, region) in fp.stages.iter().enumerate() {
            cells
                .entry(region)
                .or_default()
                .push(format!("{fifo}/stage\\[{i}\\]"));
        }
    }

    let mut out = format!("# regions of {}\n", plan.task);
    for (region, patterns) in cells {
        let _ = writeln!(
            out,
            "add_cells_to_pblock [get_pblocks {region}] [get_cells -regex {{"
        );
        for p in patterns {
            let _ = writeln!(out, "  (.*/)?{p}");
        }
        out.push_str("}]\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::Assignment;
    use crate::plan::FifoPlan;

    #[test]
    fn lists_instances_and_stages_per_region() {
        let plan = Floorplan {
            task: "T".to_string(),
            assignment: Assignment::new().with("X", &["A_0"]).with("Y", &["B_0"]),
            fifos: BTreeMap::from([(
                "f".to_string(),
                FifoPlan {
                    producer: "A_0".to_string(),
                    consumer: "B_0".to_string(),
                    partitions: 3,
                    stages: vec!["X".into(), "Z".into(), "Y".into()],
                },
            )]),
            register_level_bound: 3,
        };
        let tcl = region_script(&plan);
        let expected = "# regions of T
add_cells_to_pblock [get_pblocks X] [get_cells -regex {
  (.*/)?A_0
  (.*/)?A_0__state.*
  (.*/)?f/stage\\[0\\]
}]
add_cells_to_pblock [get_pblocks Y] [get_cells -regex {
  (.*/)?B_0
  (.*/)?B_0__state.*
  (.*/)?f/stage\\[2\\]
}]
add_cells_to_pblock [get_pblocks Z] [get_cells -regex {
  (.*/)?f/stage\\[1\\]
}]
";
        assert_eq!(tcl, expected);
    }
}
