//! Prompt templates for the analysis phases

use crate::phase::{PhaseId, PhaseInput, PhaseRecord};

/// Templates for generating prompts at each phase
pub struct PromptTemplate;

impl PromptTemplate {
    /// Default system prompt for a phase
    pub fn system(phase: PhaseId) -> &'static str {
        match phase {
            PhaseId::Phase1 => {
                r#"You are a software architect performing initial discovery on an unfamiliar codebase.
Identify how the project is laid out, what it depends on and which technologies it uses.
Base every statement on the supplied structure and files. Say so when information is missing."#
            }
            PhaseId::Phase2 => {
                r#"You are a software architect planning a detailed code review.
Turn discovery findings into a concrete, ordered plan of what to analyze and why."#
            }
            PhaseId::Phase3 => {
                r#"You are a senior engineer analyzing source code in depth.
Follow the analysis plan. Describe responsibilities, data flow, and notable implementation details of each component."#
            }
            PhaseId::Phase4 => {
                r#"You are a software architect synthesizing findings from a code analysis.
Identify architectural patterns, cross-cutting concerns, and relationships between components."#
            }
            PhaseId::Phase5 => {
                r#"You are a technical writer consolidating the results of a multi-phase code analysis.
Merge overlapping findings and resolve contradictions into a single coherent report."#
            }
            PhaseId::Final => {
                r#"You are a principal engineer writing the final analysis of a software project.
Produce a clear, well-structured report that a developer or coding agent can use to work on the project."#
            }
        }
    }

    /// User prompt for free-form analysis over a JSON context
    pub fn analyze(context: &serde_json::Value) -> String {
        format!("Analyze the following context: {}", context)
    }

    /// User prompt for the phase described by `input`
    pub fn user(input: &PhaseInput) -> String {
        match input.phase {
            PhaseId::Phase1 => Self::discovery(input),
            PhaseId::Phase2 => Self::planning(input),
            PhaseId::Phase3 => Self::deep_analysis(input),
            PhaseId::Phase4 => Self::synthesis(input),
            PhaseId::Phase5 => Self::consolidation(input),
            PhaseId::Final => Self::final_analysis(input),
        }
    }

    fn discovery(input: &PhaseInput) -> String {
        let mut prompt = format!(
            r#"Project: {}

Project structure:
{}
"#,
            input.project.name,
            input.structure().to_text()
        );

        if let Some(workspace) = &input.project.workspace {
            let pm = &workspace.package_management;
            let markers: Vec<&str> = [
                (pm.has_package_json, "package.json"),
                (pm.has_requirements_txt, "requirements.txt"),
                (pm.has_pipfile, "Pipfile"),
                (pm.has_poetry, "pyproject.toml"),
                (pm.has_cargo, "Cargo.toml"),
                (pm.has_docker, "Docker"),
            ]
            .into_iter()
            .filter_map(|(present, name)| present.then_some(name))
            .collect();

            prompt.push_str(&format!(
                "\nTop-level directories: {}\nTop-level files: {}\nPackage management: {}\n",
                join_or_none(&workspace.top_level_directories),
                join_or_none(&workspace.top_level_files),
                if markers.is_empty() {
                    "none detected".to_string()
                } else {
                    markers.join(", ")
                }
            ));
        }

        prompt.push_str(
            r#"
Report your findings under exactly these headings:

## Project Structure
## Dependencies
## Tech Stack"#,
        );
        prompt
    }

    fn planning(input: &PhaseInput) -> String {
        format!(
            r#"Project structure:
{}

Discovery findings:
{}

Create an analysis plan for this project. List the components to examine in order,
the questions to answer for each, and the files that matter most."#,
            input.structure().to_text(),
            Self::prior_section(input, PhaseId::Phase1)
        )
    }

    fn deep_analysis(input: &PhaseInput) -> String {
        let files = input.project.formatted_files();
        format!(
            r#"Analysis plan:
{}

Discovery findings:
{}

Source files:
{}

Carry out the plan and analyze the code in depth."#,
            Self::prior_section(input, PhaseId::Phase2),
            Self::prior_section(input, PhaseId::Phase1),
            if files.is_empty() {
                "(no file contents available)".to_string()
            } else {
                files
            }
        )
    }

    fn synthesis(input: &PhaseInput) -> String {
        format!(
            r#"Synthesize the following analysis results:

{}

Describe the architecture, the patterns in use, and how the components relate."#,
            Self::prior_sections(input.prior())
        )
    }

    fn consolidation(input: &PhaseInput) -> String {
        format!(
            r#"Consolidate the following analysis results into one report:

{}"#,
            Self::prior_sections(input.prior())
        )
    }

    fn final_analysis(input: &PhaseInput) -> String {
        format!(
            r#"Provide a final analysis of the consolidated report.

Project structure:
{}

Files excluded from analysis:
{}

Consolidated report:
{}"#,
            input.structure().to_text(),
            join_or_none(input.excluded_files()),
            Self::prior_sections(input.prior())
        )
    }

    fn prior_section(input: &PhaseInput, phase: PhaseId) -> &str {
        input
            .prior_output(phase)
            .unwrap_or("(no results from this phase)")
    }

    fn prior_sections(records: &[PhaseRecord]) -> String {
        if records.is_empty() {
            return "(no earlier results)".to_string();
        }
        records
            .iter()
            .map(|r| format!("--- {} ({}) ---\n{}", r.phase.display_name(), r.phase, r.output))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
