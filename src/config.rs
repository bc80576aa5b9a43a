//! Realm configuration loading.
//!
//! The config is an XML document (`config.xml` by default) with one `realm`
//! element per launchable client:
//!
//! ```xml
//! <wowreeb>
//!     <realm name="Alpha">
//!         <exe path="a.exe" sha256="..."/>
//!         <authserver host="logon.example.com"/>
//!         <fov value="75"/>
//!         <clr path="helper.dll"/>
//!     </realm>
//! </wowreeb>
//! ```
//!
//! Validation is strict inside a `realm`: unknown child elements and unknown
//! attributes abort the whole load. Unknown elements directly under the root
//! are ignored, so unrelated tooling may annotate the document. No partial
//! result is ever returned.

use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

pub const ROOT_ELEMENT: &str = "wowreeb";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config XML: {0}")]
    Parse(String),

    /// Unexpected element or attribute somewhere the schema is strict.
    #[error("unexpected {what} \"{name}\" in <{context}>")]
    Structural {
        context: String,
        what: &'static str,
        name: String,
    },

    #[error("failed to parse fov value \"{value}\" for \"{realm}\"")]
    Format { realm: String, value: String },

    #[error("realm entries must have a name")]
    Validation,
}

impl From<quick_xml::Error> for ConfigError {
    fn from(e: quick_xml::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

fn structural(context: &str, what: &'static str, name: &str) -> ConfigError {
    ConfigError::Structural {
        context: context.to_string(),
        what,
        name: name.to_string(),
    }
}

/// One launchable client configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Realm {
    pub name: String,
    pub exe_path: PathBuf,
    /// Expected SHA-256 of the executable, hex. Empty means skip verification.
    pub sha256: String,
    pub auth_server: String,
    pub fov: f32,
    /// Optional managed helper library forwarded to the injection routine.
    pub clr_dll: Option<PathBuf>,
}

/// Generic element tree the validator walks. quick-xml hands us a flat event
/// stream; realm validation wants parent/child structure.
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Element>,
}

/// Load and validate a config file. Fails as a whole on the first violation.
pub fn load_cfg(path: &Path) -> Result<Vec<Realm>, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    parse_realms(&text)
}

/// Parse config text into realm entries, document order preserved.
pub fn parse_realms(text: &str) -> Result<Vec<Realm>, ConfigError> {
    let root = parse_tree(text)?;

    let Some(root) = root else {
        return Err(structural("document", "element", ""));
    };

    // XML is case sensitive
    if root.name != ROOT_ELEMENT {
        return Err(structural("document", "element", &root.name));
    }

    let mut realms = Vec::new();

    for node in &root.children {
        // unknown top-level elements are tolerated; realm internals are not
        if node.name == "realm" {
            realms.push(parse_realm(node)?);
        }
    }

    Ok(realms)
}

fn parse_tree(text: &str) -> Result<Option<Element>, ConfigError> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    let mut attach = |stack: &mut Vec<Element>, el: Element| {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(el);
        } else if root.is_none() {
            root = Some(el);
        }
    };

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                stack.push(element_from(&start)?);
            }
            Event::Empty(start) => {
                let el = element_from(&start)?;
                attach(&mut stack, el);
            }
            Event::End(_) => {
                // the reader rejects mismatched end tags before we get here
                if let Some(el) = stack.pop() {
                    attach(&mut stack, el);
                }
            }
            Event::Eof => break,
            // text, comments, declarations and the like carry no realm data
            _ => {}
        }
    }

    // quick-xml does not flag unclosed tags at end of input on its own
    if let Some(el) = stack.pop() {
        return Err(ConfigError::Parse(format!(
            "missing end tag </{}>",
            el.name
        )));
    }

    Ok(root)
}

fn element_from(start: &BytesStart) -> Result<Element, ConfigError> {
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ConfigError::Parse(e.to_string()))?;
        attrs.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            attr.unescape_value()?.into_owned(),
        ));
    }

    Ok(Element {
        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        attrs,
        children: Vec::new(),
    })
}

fn parse_realm(node: &Element) -> Result<Realm, ConfigError> {
    let mut realm = Realm::default();

    for (key, value) in &node.attrs {
        match key.as_str() {
            "name" => realm.name = value.clone(),
            other => return Err(structural("realm", "attribute", other)),
        }
    }

    if realm.name.is_empty() {
        return Err(ConfigError::Validation);
    }

    for child in &node.children {
        match child.name.as_str() {
            "exe" => {
                for (key, value) in &child.attrs {
                    match key.as_str() {
                        "path" => realm.exe_path = PathBuf::from(value),
                        "sha256" => realm.sha256 = value.clone(),
                        other => return Err(structural("exe", "attribute", other)),
                    }
                }
            }
            "authserver" => {
                for (key, value) in &child.attrs {
                    match key.as_str() {
                        "host" => realm.auth_server = value.clone(),
                        other => return Err(structural("authserver", "attribute", other)),
                    }
                }
            }
            "fov" => {
                for (key, value) in &child.attrs {
                    match key.as_str() {
                        "value" => {
                            realm.fov = value.parse::<f32>().map_err(|_| ConfigError::Format {
                                realm: realm.name.clone(),
                                value: value.clone(),
                            })?;
                        }
                        other => return Err(structural("fov", "attribute", other)),
                    }
                }
            }
            "clr" => {
                for (key, value) in &child.attrs {
                    match key.as_str() {
                        "path" => realm.clr_dll = Some(PathBuf::from(value)),
                        other => return Err(structural("clr", "attribute", other)),
                    }
                }
            }
            other => return Err(structural("realm", "element", other)),
        }
    }

    Ok(realm)
}
