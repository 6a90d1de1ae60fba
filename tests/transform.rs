//! End-to-end tests: parse a file, transform it and inspect the printed code.

use std::fs;
use std::sync::Arc;

use css_modules_transform::{
    CollectingSink, Config, ConfigCell, CssProcessor, Diagnostic, FsLoader, MemoryLoader,
    PluginOptions, Position, ProcessError, TransformError, transform_source,
};

// =============================================================================
// Helper Functions
// =============================================================================

/// Removes all whitespace so assertions do not depend on printer layout.
fn squash(code: &str) -> String {
    code.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Turns CSS into an object holding the text as a string.
fn text_processor(_: &str, css: &str) -> Result<String, ProcessError> {
    if css.contains("!!") {
        return Err(ProcessError::new("bad token"));
    }
    Ok(format!("{{ text: {:?} }}", css.trim()))
}

fn config_with(processor: Arc<dyn CssProcessor>, throw_on_error: bool) -> Config {
    let options = PluginOptions {
        throw_on_error,
        ..PluginOptions::default()
    };
    Config::from_options(&options, processor).unwrap()
}

fn lenient() -> Config {
    config_with(Arc::new(text_processor), false)
}

fn strict() -> Config {
    config_with(Arc::new(text_processor), true)
}

fn loader() -> MemoryLoader {
    MemoryLoader::new()
        .with("./foo.css", ".root { color: red; }")
        .with("./broken.css", ".root { color: red !! }")
}

fn run(config: &Config, source: &str) -> (Result<String, TransformError>, Vec<Diagnostic>) {
    let sink = CollectingSink::new();
    let result = transform_source(source, "src/app.js", config, &loader(), &sink);
    (result, sink.take())
}

// =============================================================================
// Tagged templates
// =============================================================================

mod templates {
    use super::*;

    #[test]
    fn static_template_is_replaced_by_processor_output() {
        let processor = |_: &str, _: &str| Ok::<_, ProcessError>("{ root: \"a\" }".to_string());
        let config = config_with(Arc::new(processor), false);

        let (output, diagnostics) = run(&config, "const styles = css`color: red;`;");

        assert_eq!(squash(&output.unwrap()), r#"conststyles=({root:"a"});"#);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn lenient_failure_reports_and_substitutes_empty_object() {
        let (output, diagnostics) = run(&lenient(), "const styles = css`color: red !!;`;");

        assert_eq!(squash(&output.unwrap()), "conststyles=({});");
        assert_eq!(
            diagnostics,
            vec![Diagnostic::new("bad token", "src/app.js").at(Position { line: 1, column: 0 })]
        );
    }

    #[test]
    fn failure_in_multiline_template_reports_corrected_line() {
        let source = "const a = 1;\nconst styles = css`\n    color: red !!;\n`;\n";
        let (output, diagnostics) = run(&lenient(), source);

        assert!(output.is_ok());
        assert_eq!(diagnostics[0].relative, Some(Position { line: 1, column: 4 }));
    }

    #[test]
    fn strict_failure_aborts_file() {
        let (output, diagnostics) = run(&strict(), "const styles = css`color: red !!;`;");

        let err = output.unwrap_err();
        assert!(matches!(err, TransformError::Process(_)));
        assert_eq!(err.to_string(), "bad token");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn interpolations_are_moved_into_output() {
        let source = "const accent = \"red\";\nconst styles = css`color: ${accent};`;";
        let (output, _) = run(&lenient(), source);

        assert_eq!(
            squash(&output.unwrap()),
            r#"constaccent="red";conststyles=({text:("color:"+accent+";")});"#
        );
    }

    #[test]
    fn interpolated_expressions_keep_their_structure() {
        let source = "const styles = css`margin: ${gap * 2}px ${theme.size(1)};`;";
        let (output, _) = run(&lenient(), source);

        let output = squash(&output.unwrap());
        assert!(output.contains("+(gap*2)+"), "{output}");
        assert!(output.contains("+theme.size(1)+"), "{output}");
        assert!(!output.contains("__css_hole_"), "{output}");
    }

    #[test]
    fn nested_templates_are_compiled_first() {
        let source = "const styles = css`a: ${css`b`};`;";
        let (output, _) = run(&lenient(), source);

        assert_eq!(
            squash(&output.unwrap()),
            r#"conststyles=({text:("a:"+({text:"b"})+";")});"#
        );
    }

    #[test]
    fn other_tags_are_left_alone() {
        let (output, diagnostics) = run(&lenient(), "const a = styled`color: red !!;`;");

        assert_eq!(squash(&output.unwrap()), "consta=styled`color:red!!;`;");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn custom_namespace() {
        let options = PluginOptions::from_json(r#"{ "namespace": "style" }"#).unwrap();
        let config = Config::from_options(&options, Arc::new(text_processor)).unwrap();

        let (output, _) = run(&config, "const a = style`x`; const b = css`y`;");

        assert_eq!(squash(&output.unwrap()), r#"consta=({text:"x"});constb=css`y`;"#);
    }

    #[test]
    fn lenient_mode_reports_every_failure() {
        let source = "const a = css`!!`;\nconst b = css`ok`;\nconst c = css`!!`;";
        let (output, diagnostics) = run(&lenient(), source);

        assert_eq!(
            squash(&output.unwrap()),
            r#"consta=({});constb=({text:"ok"});constc=({});"#
        );
        let lines: Vec<_> = diagnostics
            .iter()
            .map(|d| d.relative.map(|p| p.line))
            .collect();
        assert_eq!(lines, vec![Some(1), Some(3)]);
    }

    #[test]
    fn invalid_processor_output_is_fatal_even_when_lenient() {
        let processor = |_: &str, _: &str| Ok::<_, ProcessError>("{ root: ".to_string());
        let config = config_with(Arc::new(processor), false);

        let (output, _) = run(&config, "const a = css`x`;");

        assert!(matches!(output, Err(TransformError::Splice(_))));
    }

    #[test]
    fn interpolation_in_quoted_key_becomes_computed_key() {
        let processor = |_: &str, css: &str| {
            assert_eq!(css, ".__css_hole_0 { color: red; }");
            Ok::<_, ProcessError>("{ \"__css_hole_0\": \"hashed\" }".to_string())
        };
        let config = config_with(Arc::new(processor), false);

        let (output, diagnostics) = run(&config, "const s = css`.${name} { color: red; }`;");

        assert_eq!(squash(&output.unwrap()), r#"consts=({[""+name]:"hashed"});"#);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn interpolation_in_shorthand_property_is_kept() {
        let processor = |_: &str, _: &str| Ok::<_, ProcessError>("{ __css_hole_0 }".to_string());
        let config = config_with(Arc::new(processor), false);

        let (output, _) = run(&config, "const s = css`${n}`;");

        assert_eq!(squash(&output.unwrap()), "consts=({[n]:n});");
    }

    #[test]
    fn string_holding_interpolation_keeps_member_access() {
        let processor =
            |_: &str, _: &str| Ok::<_, ProcessError>("\"x__css_hole_0\".length".to_string());
        let config = config_with(Arc::new(processor), false);

        let (output, _) = run(&config, "const s = css`${n}`;");

        assert_eq!(squash(&output.unwrap()), r#"consts=("x"+n).length;"#);
    }

    #[test]
    fn processor_output_with_trailing_comment_is_accepted() {
        let processor =
            |_: &str, _: &str| Ok::<_, ProcessError>("{ a: 1 } // generated".to_string());
        let config = config_with(Arc::new(processor), false);

        let (output, _) = run(&config, "const s = css`x`;");

        assert_eq!(squash(&output.unwrap()), "consts=({a:1});");
    }

    #[test]
    fn processor_output_with_trailing_code_is_fatal() {
        let processor =
            |_: &str, _: &str| Ok::<_, ProcessError>("{ a: 1 }) ; (garbage".to_string());
        let config = config_with(Arc::new(processor), false);

        let (output, _) = run(&config, "const s = css`x`;");

        assert!(matches!(output, Err(TransformError::Splice(_))));
    }

    #[test]
    fn template_in_statement_position_stays_an_expression() {
        let (output, _) = run(&lenient(), "css`x`;");
        assert_eq!(squash(&output.unwrap()), r#"({text:"x"});"#);
    }
}

// =============================================================================
// require() calls
// =============================================================================

mod requires {
    use super::*;

    #[test]
    fn require_is_replaced_by_compiled_module() {
        let processor = |_: &str, raw: &str| {
            assert_eq!(raw, ".root { color: red; }");
            Ok::<_, ProcessError>("{ color: \"red\" }".to_string())
        };
        let config = config_with(Arc::new(processor), false);

        let (output, _) = run(&config, "const theme = require(\"./foo.css\");");

        assert_eq!(squash(&output.unwrap()), r#"consttheme=({color:"red"});"#);
    }

    #[test]
    fn other_requires_are_left_alone() {
        let source = "const a = require(\"./a.js\");\nconst b = require(path);\nconst c = load(\"./foo.css\");";
        let (output, diagnostics) = run(&lenient(), source);

        assert_eq!(
            squash(&output.unwrap()),
            r#"consta=require("./a.js");constb=require(path);constc=load("./foo.css");"#
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn missing_module_falls_back_to_noop_function() {
        let (output, diagnostics) = run(&lenient(), "require(\"./missing.css\")();");

        assert_eq!(squash(&output.unwrap()), "(()=>{})();");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].filename, "src/app.js");
        assert_eq!(diagnostics[0].relative, None);
    }

    #[test]
    fn strict_process_failure_aborts_file() {
        let (output, _) = run(&strict(), "const a = require(\"./broken.css\");");
        assert_eq!(output.unwrap_err().to_string(), "bad token");
    }
}

// =============================================================================
// Default imports
// =============================================================================

mod imports {
    use super::*;

    #[test]
    fn default_import_becomes_const_binding() {
        let processor = |_: &str, _: &str| Ok::<_, ProcessError>("{ root: \"x_root\" }".to_string());
        let config = config_with(Arc::new(processor), false);

        let (output, _) = run(&config, "import x from \"./foo.css\";\nconsole.log(x.root);");

        assert_eq!(
            squash(&output.unwrap()),
            r#"constx=({root:"x_root"});console.log(x.root);"#
        );
    }

    #[test]
    fn other_imports_are_left_alone() {
        let source = "import a from \"./a.js\";\nimport { b } from \"./foo.css\";\nimport \"./foo.css\";";
        let (output, _) = run(&lenient(), source);

        assert_eq!(
            squash(&output.unwrap()),
            r#"importafrom"./a.js";import{b}from"./foo.css";import"./foo.css";"#
        );
    }

    #[test]
    fn named_specifiers_are_dropped_with_the_import() {
        let (output, _) = run(&lenient(), "import x, { y } from \"./foo.css\";");
        assert_eq!(
            squash(&output.unwrap()),
            r#"constx=({text:".root{color:red;}"});"#
        );
    }

    #[test]
    fn failed_import_binds_fallback() {
        let (output, diagnostics) = run(&lenient(), "import x from \"./broken.css\";");

        assert_eq!(squash(&output.unwrap()), "constx=(()=>{});");
        assert_eq!(diagnostics[0].message, "bad token");
    }

    #[test]
    fn typescript_files_are_supported() {
        let sink = CollectingSink::new();
        let output = transform_source(
            "import x from \"./foo.css\";\nconst n: number = 1;",
            "src/app.ts",
            &lenient(),
            &loader(),
            &sink,
        )
        .unwrap();

        assert_eq!(
            squash(&output),
            r#"constx=({text:".root{color:red;}"});constn:number=1;"#
        );
    }
}

// =============================================================================
// Session and host integration
// =============================================================================

#[test]
fn config_cell_shares_first_config_across_files() {
    let cell = ConfigCell::new();
    let first = cell
        .get_or_init(&PluginOptions::default(), Arc::new(text_processor))
        .unwrap();

    let other = PluginOptions::from_json(r#"{ "namespace": "style", "throwOnError": true }"#)
        .unwrap();
    let second = cell.get_or_init(&other, Arc::new(text_processor)).unwrap();

    let (output, _) = run(&second, "const a = css`!!`; const b = style`x`;");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(squash(&output.unwrap()), "consta=({});constb=style`x`;");
}

#[test]
fn files_are_loaded_relative_to_the_importer() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("button.css"), ".button {}").unwrap();
    let filename = dir.path().join("button.js");

    let sink = CollectingSink::new();
    let output = transform_source(
        "const s = require(\"./button.css\");",
        filename.to_str().unwrap(),
        &lenient(),
        &FsLoader::new(),
        &sink,
    )
    .unwrap();

    assert_eq!(squash(&output), r#"consts=({text:".button{}"});"#);
    assert!(sink.is_empty());
}

#[test]
fn unparseable_input_is_reported() {
    let sink = CollectingSink::new();
    let err = transform_source("const = ;", "src/app.js", &lenient(), &loader(), &sink)
        .unwrap_err();
    assert!(matches!(err, TransformError::Parse { ref filename, .. } if filename == "src/app.js"));
}

#[test]
fn diagnostics_render_against_the_file() {
    let source = "const a = 1;\nconst styles = css`color: red !!;`;\n";
    let (_, diagnostics) = run(&lenient(), source);

    let rendered = diagnostics[0].render(source);
    assert!(rendered.contains(" --> src/app.js:2:0\n"), "{rendered}");
    assert!(rendered.contains("2 | const styles = css`color: red !!;`;"), "{rendered}");
}

#[test]
fn comments_survive_the_transform() {
    let (output, _) = run(&lenient(), "// keep me\nconst a = css`x`;");
    assert!(output.unwrap().contains("// keep me"));
}
