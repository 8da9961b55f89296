//! Project id resolution: explicit id, then name, then linked repository.

use anyhow::bail;
use qualitymax_client::ExecutionClient;
use tracing::info;

pub async fn resolve_project_id(
    client: &ExecutionClient,
    project_id: Option<&str>,
    project_name: Option<&str>,
    repository: &str,
) -> anyhow::Result<String> {
    if let Some(id) = project_id.map(str::trim).filter(|s| !s.is_empty()) {
        info!("Using provided project ID: {}", id);
        return Ok(id.to_string());
    }

    if let Some(name) = project_name.map(str::trim).filter(|s| !s.is_empty()) {
        info!("Resolving project by name: \"{}\"...", name);
        let projects = client.list_projects().await?;
        let wanted = name.to_lowercase();
        if let Some(found) = projects.iter().find(|p| p.name.to_lowercase() == wanted) {
            info!("Resolved project \"{}\" -> {}", name, found.id);
            return Ok(found.id.clone());
        }

        info!(
            "No exact name match for \"{}\". Trying to resolve by repository: {}...",
            name, repository
        );
        if let Some(id) = client.resolve_project(repository).await? {
            info!("Resolved project via linked repository -> {}", id);
            return Ok(id);
        }

        let available = projects
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        bail!(
            "Project \"{}\" not found. Available projects: {}. \
             Tip: use the exact project name from QualityMax, or link the repository to your project.",
            name,
            if available.is_empty() { "none" } else { available.as_str() }
        );
    }

    info!("Auto-detecting project from repository: {}...", repository);
    match client.resolve_project(repository).await? {
        Some(id) => {
            info!("Auto-detected project: {}", id);
            Ok(id)
        }
        None => bail!(
            "Could not auto-detect project. Provide --project-id or --project-name, \
             or link your repository in QualityMax project settings."
        ),
    }
}
