use log::debug;
use minijinja::{AutoEscape, Environment, context};
use umdpack_core::{CollaboratorError, ModuleWrapper, WrapConfig};

const HEADER: &str = "header.js.j2";
const FOOTER: &str = "footer.js.j2";

/// Universal module definition wrapper.
///
/// The bundle runs inside a factory function. With an AMD loader the factory
/// is registered under the module id; under CommonJS its result becomes
/// `module.exports`; otherwise it is assigned to the global alias. The factory
/// throws if any segment of the export path is missing once the bundle has run.
///
/// The bundle itself never passes through the template engine: the rendered
/// header and footer are spliced around the original bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct UmdWrapper;

impl UmdWrapper {
    fn environment() -> Result<Environment<'static>, minijinja::Error> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);
        env.add_template(HEADER, include_str!("../templates/header.js.j2"))?;
        env.add_template(FOOTER, include_str!("../templates/footer.js.j2"))?;
        Ok(env)
    }

    fn render(config: &WrapConfig) -> Result<(String, String), minijinja::Error> {
        let env = Self::environment()?;
        let ctx = context! {
            module_id => config.module_id,
            global_alias => config.global_alias,
            export_path => config.export.to_string(),
            root => config.export.root(),
            prefixes => config.export.prefixes(),
        };
        let header = env.get_template(HEADER)?.render(&ctx)?;
        let footer = env.get_template(FOOTER)?.render(&ctx)?;
        Ok((header, footer))
    }
}

impl ModuleWrapper for UmdWrapper {
    fn wrap(&self, source: &[u8], config: &WrapConfig) -> Result<Vec<u8>, CollaboratorError> {
        let (header, footer) =
            Self::render(config).map_err(|e| CollaboratorError::Template(e.to_string()))?;

        let mut out = Vec::with_capacity(header.len() + source.len() + footer.len() + 1);
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(source);
        if !source.is_empty() && !source.ends_with(b"\n") {
            out.push(b'\n');
        }
        out.extend_from_slice(footer.as_bytes());

        debug!(
            "wrapped {} bytes as `{}` (global `{}`, export `{}`)",
            source.len(),
            config.module_id,
            config.global_alias,
            config.export
        );
        Ok(out)
    }
}
