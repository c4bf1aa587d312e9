use std::io::Write;
use std::path::Path;

use crate::package_manager::PackageManager;

pub fn print_run_instructions(
    out: &mut impl Write,
    project_root: &Path,
    project_name: &str,
    package_manager: Option<PackageManager>,
) -> std::io::Result<()> {
    writeln!(out, "Run instructions for {}:", project_name)?;
    writeln!(out, "  • cd {}", project_root.display())?;
    if let Some(pm) = package_manager {
        writeln!(out, "  • {}", pm.run_command())?;
    }
    out.flush()
}
