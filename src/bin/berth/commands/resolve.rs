//! `berth resolve` command
//!
//! Loads a project descriptor into the in-memory host and runs the provider
//! chain over it.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::ResolveArgs;
use berth::core::ProjectSystem;
use berth::host::ProjectDescriptor;
use berth::providers::ResolutionContext;
use berth::util::config::load_for;
use berth::util::diagnostic::{emit, suggestions, NoProjectSystemError};
use berth::{Coordinator, ProjectHandle, ProjectSystemFactory};

pub fn execute(args: ResolveArgs, color: bool) -> Result<()> {
    let descriptor = ProjectDescriptor::load(&args.descriptor)?;
    let base = args
        .descriptor
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let solution_dir = args.solution_dir.as_deref().unwrap_or(base);

    let config = load_for(solution_dir);
    let (project, workspace) = descriptor.build(base);

    let coordinator = Coordinator::new().context("failed to start coordinator")?;
    let handle = Arc::new(ProjectHandle::new(
        Arc::new(project),
        Arc::new(workspace),
        coordinator,
    ));

    let factory = ProjectSystemFactory::from_config(&config)?;
    let ctx = ResolutionContext::from_config(solution_dir, &config);

    let resolution = match factory.resolve(&handle, &ctx) {
        Ok(resolution) => resolution,
        Err(err) => {
            emit(&err.to_diagnostic(), color);
            return Err(err.into());
        }
    };

    for fault in &resolution.warnings {
        emit(&fault.to_diagnostic(), color);
    }

    let Some(system) = resolution.system else {
        return Err(NoProjectSystemError {
            project: descriptor.name.clone(),
            help: Some(suggestions::NO_PROJECT_SYSTEM.to_string()),
        }
        .into());
    };

    print_system(&system);
    if args.references {
        print_references(&system)?;
    }

    Ok(())
}

fn print_system(system: &ProjectSystem) {
    println!("{}", system.name());
    println!("  provider:  {}", system.provider());
    println!("  style:     {}", system.style());
    println!("  kind:      {}", system.kind());
    println!("  framework: {}", system.target_framework());
    if !system.frameworks().is_empty() {
        println!("  frameworks: {}", system.frameworks().join(", "));
    }
    if let Some(path) = system.packages_path() {
        println!("  packages:  {}", path.display());
    }
    if let Some(path) = system.manifest_path() {
        println!("  manifest:  {}", path.display());
    }
}

fn print_references(system: &ProjectSystem) -> Result<()> {
    let references = system
        .package_references()
        .with_context(|| format!("failed to read references of `{}`", system.name()))?;

    if references.is_empty() {
        println!("  (no package references)");
    } else {
        println!("  references:");
        for reference in references {
            println!("    {}", reference);
        }
    }
    Ok(())
}
