use iced::{
    widget::{button, checkbox, column, pick_list, row, text, text_input, Space},
    Element, Length,
};

use crate::domain::{BuildRequest, RuntimeVersion, TargetPlatform};

/// Layer creation form state
pub struct LayerForm {
    pub name: String,
    pub runtime: RuntimeVersion,
    pub platform: TargetPlatform,
    pub install_dependencies: bool,
    pub upgrade_dependencies: bool,
    pub dependencies: Vec<String>,
    pub dependency_input: String,
}

impl Default for LayerForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            runtime: RuntimeVersion::default(),
            platform: TargetPlatform::default(),
            install_dependencies: true,
            // Keep pinned versions unless the user opts in to upgrades
            upgrade_dependencies: false,
            dependencies: Vec::new(),
            dependency_input: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum FormMessage {
    NameChanged(String),
    RuntimeSelected(RuntimeVersion),
    PlatformSelected(TargetPlatform),
    InstallToggled(bool),
    UpgradeToggled(bool),
    DependencyInputChanged(String),
    AddDependency,
    RemoveDependency(usize),
    SubmitPressed,
}

impl LayerForm {
    pub fn update(&mut self, message: FormMessage) {
        match message {
            FormMessage::NameChanged(name) => self.name = name,
            FormMessage::RuntimeSelected(runtime) => self.runtime = runtime,
            FormMessage::PlatformSelected(platform) => self.platform = platform,
            FormMessage::InstallToggled(install) => self.install_dependencies = install,
            FormMessage::UpgradeToggled(upgrade) => self.upgrade_dependencies = upgrade,
            FormMessage::DependencyInputChanged(value) => self.dependency_input = value,
            FormMessage::AddDependency => self.add_dependency(),
            FormMessage::RemoveDependency(index) => {
                if index < self.dependencies.len() {
                    self.dependencies.remove(index);
                }
            }
            FormMessage::SubmitPressed => {
                // Handled by the app
            }
        }
    }

    fn add_dependency(&mut self) {
        let dependency = self.dependency_input.trim().to_string();
        if dependency.is_empty() || self.dependencies.contains(&dependency) {
            return;
        }
        self.dependencies.push(dependency);
        self.dependency_input.clear();
    }

    pub fn build_request(&self) -> BuildRequest {
        BuildRequest {
            name: self.name.trim().to_string(),
            runtime: self.runtime,
            platform: self.platform,
            dependencies: self.dependencies.clone(),
            install_dependencies: self.install_dependencies,
            upgrade_dependencies: self.upgrade_dependencies,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn view(&self, submitting: bool) -> Element<'_, FormMessage> {
        let mut dependency_rows = column![].spacing(5);
        for (index, dependency) in self.dependencies.iter().enumerate() {
            dependency_rows = dependency_rows.push(
                row![
                    text(dependency).size(14).width(Length::Fill),
                    button(text("Remove").size(12))
                        .on_press(FormMessage::RemoveDependency(index)),
                ]
                .spacing(10),
            );
        }

        let mut toggles = column![checkbox(self.install_dependencies)
            .label("Install dependencies with pip (recommended)")
            .on_toggle(FormMessage::InstallToggled)]
        .spacing(5);
        if self.install_dependencies {
            toggles = toggles.push(
                checkbox(self.upgrade_dependencies)
                    .label("Upgrade packages to latest versions (--upgrade)")
                    .on_toggle(FormMessage::UpgradeToggled),
            );
        }

        let submit_label = if submitting {
            "Creating Layer..."
        } else {
            "Create Lambda Layer"
        };

        column![
            text("Layer Name:").size(16),
            text_input("my-lambda-layer", &self.name)
                .on_input(FormMessage::NameChanged)
                .padding(10),
            Space::new().height(Length::Fixed(10.0)),
            text("Python Runtime:").size(16),
            pick_list(
                &RuntimeVersion::ALL[..],
                Some(self.runtime),
                FormMessage::RuntimeSelected
            ),
            Space::new().height(Length::Fixed(10.0)),
            text("Target Platform:").size(16),
            pick_list(
                &TargetPlatform::ALL[..],
                Some(self.platform),
                FormMessage::PlatformSelected
            ),
            Space::new().height(Length::Fixed(10.0)),
            toggles,
            Space::new().height(Length::Fixed(10.0)),
            text("Layer Dependencies:").size(16),
            row![
                text_input("e.g., requests==2.31.0 or fastapi[all]", &self.dependency_input)
                    .on_input(FormMessage::DependencyInputChanged)
                    .on_submit(FormMessage::AddDependency)
                    .padding(10),
                button("Add").on_press(FormMessage::AddDependency).padding([10, 20]),
            ]
            .spacing(10),
            dependency_rows,
            Space::new().height(Length::Fixed(20.0)),
            button(submit_label)
                .on_press(FormMessage::SubmitPressed)
                .padding([10, 20]),
        ]
        .spacing(10)
        .into()
    }
}
