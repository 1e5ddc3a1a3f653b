use iced::{
    widget::{button, column, row, scrollable, text, text_input, Space},
    Element, Length,
};

use crate::api::ArtifactSummary;
use crate::utils::format_size;

#[derive(Debug, Clone)]
pub enum ListMessage {
    SearchChanged(String),
    ClearSearch,
    RefreshPressed,
    DownloadPressed(usize),
}

pub fn view<'a>(
    artifacts: &'a [ArtifactSummary],
    search_query: &'a str,
) -> Element<'a, ListMessage> {
    let mut search_row = row![
        text_input("Search layers by name or dependencies...", search_query)
            .on_input(ListMessage::SearchChanged)
            .padding(10),
        button("Refresh")
            .on_press(ListMessage::RefreshPressed)
            .padding([10, 20]),
    ]
    .spacing(10);
    if !search_query.is_empty() {
        search_row = search_row.push(
            button("Clear")
                .on_press(ListMessage::ClearSearch)
                .padding([10, 20]),
        );
    }

    let body: Element<'a, ListMessage> = if artifacts.is_empty() {
        let message = if search_query.is_empty() {
            "No layers created yet. Create your first Lambda layer!".to_string()
        } else {
            format!("No layers found matching \"{}\"", search_query)
        };
        text(message).size(14).into()
    } else {
        let mut rows = column![].spacing(15);
        for (index, artifact) in artifacts.iter().enumerate() {
            rows = rows.push(artifact_row(index, artifact));
        }
        scrollable(rows).height(Length::Fill).into()
    };

    column![
        text("Recent Layers").size(20),
        search_row,
        Space::new().height(Length::Fixed(10.0)),
        body,
    ]
    .spacing(10)
    .into()
}

fn artifact_row(index: usize, artifact: &ArtifactSummary) -> Element<'_, ListMessage> {
    let mut meta = format!(
        "{} | {}",
        artifact.last_modified,
        format_size(artifact.size)
    );
    if artifact.dependency_count > 0 {
        meta.push_str(&format!(" | {} dependencies", artifact.dependency_count));
    }

    let platform_info = [
        artifact.runtime_version.as_str(),
        artifact.platform.as_str(),
    ]
    .iter()
    .filter(|part| !part.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(" / ");

    let dependencies = if artifact.dependencies.is_empty() {
        "No dependencies".to_string()
    } else {
        artifact.dependencies.join(", ")
    };

    let mut details = column![text(&artifact.file_name).size(16), text(meta).size(12)].spacing(3);
    if !platform_info.is_empty() {
        details = details.push(text(platform_info).size(12));
    }
    details = details.push(text(format!("Dependencies: {}", dependencies)).size(12));

    column![
        details,
        button("Download")
            .on_press(ListMessage::DownloadPressed(index))
            .padding([5, 15]),
    ]
    .spacing(5)
    .into()
}
