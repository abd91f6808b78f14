// SPDX-License-Identifier: MIT

//! Prompt templates for the LLM generator

pub const MAIN_README_SYSTEM: &str = "You are an expert technical writer creating \
comprehensive README documentation for a software project. Write clear, well-structured \
Markdown. Do not invent features that are not evident from the provided context.";

pub const MAIN_README_USER: &str = "Create a README.md for the repository `{repo_name}`.

Languages: {languages}
Frameworks: {frameworks}
File tree:
{file_tree}

Include: a short project description, key features evident from the structure, \
and an overview of the main directories.";

pub const FOLDER_README_SYSTEM: &str = "You are documenting one directory of a codebase. \
Describe the purpose of the directory and its files in Markdown.";

pub const FOLDER_README_USER: &str = "Create a README.md for the `{folder}` directory \
of `{repo_name}`.

Files:
{files}

Samples:
{samples}";

pub const FILE_DOC_SYSTEM: &str = "You are documenting a single source file. Explain what \
the code does, its main functions or types, and how it fits into the project. Markdown.";

pub const FILE_DOC_USER: &str = "Explain the file `{path}` from `{repo_name}`:

```
{content}
```";

pub const SETUP_GUIDE_SYSTEM: &str = "You are writing a practical \"How to Run\" guide. \
Base every instruction on the provided manifests; do not guess package names.";

pub const SETUP_GUIDE_USER: &str = "Create a SETUP.md for `{repo_name}`.

Languages: {languages}
Frameworks: {frameworks}
Manifests:
{manifests}";
