//! Lightning web component conventions used by `test create`.

use std::path::{Path, PathBuf};

/// `myButton` → `MyButton`.
pub fn class_name(module: &str) -> String {
    let mut chars = module.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `myButton` → `c-my-button`.
pub fn element_name(module: &str) -> String {
    let mut name = String::from("c-");
    for ch in module.chars() {
        if ch.is_ascii_uppercase() {
            name.push('-');
            name.push(ch.to_ascii_lowercase());
        } else {
            name.push(ch);
        }
    }
    name
}

/// Jest suite skeleton for the component module `module`.
pub fn jest_suite(module: &str) -> String {
    let class = class_name(module);
    let element = element_name(module);
    format!(
        "import {{ createElement }} from 'lwc';
import {class} from 'c/{module}';

describe('{element}', () => {{
    afterEach(() => {{
        // The jsdom instance is shared across test cases in a single file so reset the DOM
        while (document.body.firstChild) {{
            document.body.removeChild(document.body.firstChild);
        }}
    }});

    it('TODO: test case generated by CLI command, please fill in test logic', () => {{
        const element = createElement('{element}', {{
            is: {class}
        }});
        document.body.appendChild(element);
        expect(1).toBe(2);
    }});
}});"
    )
}

/// Where the test for a component module goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestLocation {
    /// Module name, the file stem of the component's `.js` file.
    pub module: String,
    /// `<bundle>/<dir_name>`
    pub dir: PathBuf,
    /// `<bundle>/<dir_name>/<module>.test.js`
    pub file: PathBuf,
}

impl TestLocation {
    /// `None` when the path has no UTF-8 file stem.
    pub fn for_module(module_path: &Path, dir_name: &str) -> Option<Self> {
        let module = module_path.file_stem()?.to_str()?.to_owned();
        let bundle = module_path.parent()?;
        let dir = bundle.join(dir_name);
        let file = dir.join(format!("{module}.test.js"));
        Some(Self { module, dir, file })
    }
}

/// Nearest ancestor of `start` containing `marker`.
pub fn find_project_root(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .skip(1)
        .find(|dir| dir.join(marker).is_file())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn names_follow_lwc_conventions() {
        assert_eq!(class_name("myButton"), "MyButton");
        assert_eq!(element_name("myButton"), "c-my-button");
        assert_eq!(element_name("dataTableRow"), "c-data-table-row");
        assert_eq!(element_name("simple"), "c-simple");
        assert_eq!(class_name(""), "");
    }

    #[test]
    fn suite_imports_and_mounts_component() {
        let suite = jest_suite("myButton");
        assert!(suite.starts_with("import { createElement } from 'lwc';\n"));
        assert!(suite.contains("import MyButton from 'c/myButton';"));
        assert!(suite.contains("describe('c-my-button', () => {"));
        assert!(suite.contains("createElement('c-my-button', {\n            is: MyButton\n        });"));
        assert!(suite.ends_with("});"));
    }

    #[test]
    fn test_location_is_inside_bundle() {
        let loc = TestLocation::for_module(
            Path::new("/proj/lwc/myButton/myButton.js"),
            "__tests__",
        )
        .unwrap();
        assert_eq!(loc.module, "myButton");
        assert_eq!(loc.dir, PathBuf::from("/proj/lwc/myButton/__tests__"));
        assert_eq!(
            loc.file,
            PathBuf::from("/proj/lwc/myButton/__tests__/myButton.test.js")
        );
    }

    #[test]
    fn project_root_is_nearest_marker() {
        let tmp = TempDir::new().unwrap();
        let bundle = tmp.path().join("force-app/lwc/foo");
        std::fs::create_dir_all(&bundle).unwrap();
        std::fs::write(tmp.path().join("sfdx-project.json"), "{}").unwrap();

        let root = find_project_root(&bundle.join("foo.js"), "sfdx-project.json");
        assert_eq!(root.as_deref(), Some(tmp.path()));
        assert_eq!(find_project_root(&bundle.join("foo.js"), "nope.json"), None);
    }
}
