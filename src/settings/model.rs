use serde::{Deserialize, Serialize};

/// Effective Maven settings: the merged content of the global and user
/// `settings.xml` files. Unknown elements are ignored when parsing;
/// collections keep their document order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename = "settings", rename_all = "camelCase")]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_repository: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offline: Option<bool>,
    #[serde(skip_serializing_if = "Servers::is_empty")]
    pub servers: Servers,
    #[serde(skip_serializing_if = "Mirrors::is_empty")]
    pub mirrors: Mirrors,
    #[serde(skip_serializing_if = "Proxies::is_empty")]
    pub proxies: Proxies,
}

impl Settings {
    /// Looks up a server entry by id.
    pub fn server(&self, id: &str) -> Option<&Server> {
        self.servers.entries.iter().find(|s| s.id == id)
    }

    /// Renders the settings as a `settings.xml` document.
    pub fn to_xml(&self) -> Result<String, quick_xml::SeError> {
        let mut out = String::new();
        let mut ser = quick_xml::se::Serializer::new(&mut out);
        ser.indent(' ', 2);
        self.serialize(ser)?;
        Ok(out)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Servers {
    #[serde(default, rename = "server", skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<Server>,
}

impl Servers {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mirrors {
    #[serde(default, rename = "mirror", skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<Mirror>,
}

impl Mirrors {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Proxies {
    #[serde(default, rename = "proxy", skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<Proxy>,
}

impl Proxies {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One `<server>` entry. The password and passphrase may each hold a
/// plaintext value, a decorated encrypted token or an `${env.NAME}`
/// reference.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Server {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_permissions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory_permissions: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Mirror {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirror_of: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Proxy {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_proxy_hosts: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_SETTINGS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<settings xmlns="http://maven.apache.org/SETTINGS/1.0.0"
          xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
          xsi:schemaLocation="http://maven.apache.org/SETTINGS/1.0.0 https://maven.apache.org/xsd/settings-1.0.0.xsd">
  <!-- team-wide defaults -->
  <localRepository>/var/maven/repository</localRepository>
  <interactiveMode>false</interactiveMode>
  <servers>
    <server>
      <id>releases</id>
      <username>deployer</username>
      <password>{COQLCE6DU6GtcS5P=}</password>
    </server>
    <server>
      <id>site</id>
      <privateKey>/home/deployer/.ssh/id_ed25519</privateKey>
      <passphrase>plain passphrase</passphrase>
      <filePermissions>664</filePermissions>
      <directoryPermissions>775</directoryPermissions>
    </server>
  </servers>
  <mirrors>
    <mirror>
      <id>internal-mirror</id>
      <name>Internal mirror</name>
      <url>https://repo.example.com/maven2</url>
      <mirrorOf>central</mirrorOf>
    </mirror>
  </mirrors>
  <proxies>
    <proxy>
      <id>corp-http</id>
      <active>true</active>
      <protocol>http</protocol>
      <host>proxy.example.com</host>
      <port>3128</port>
      <username>proxyuser</username>
      <password>proxypass</password>
      <nonProxyHosts>localhost|*.example.com</nonProxyHosts>
    </proxy>
  </proxies>
  <pluginGroups>
    <pluginGroup>org.example.plugins</pluginGroup>
  </pluginGroups>
</settings>
"#;

    #[test]
    fn test_parse_full_settings() {
        let settings: Settings = quick_xml::de::from_str(FULL_SETTINGS).unwrap();

        assert_eq!(
            settings.local_repository.as_deref(),
            Some("/var/maven/repository")
        );
        assert_eq!(settings.interactive_mode, Some(false));
        assert_eq!(settings.offline, None);

        assert_eq!(settings.servers.entries.len(), 2);
        let releases = settings.server("releases").unwrap();
        assert_eq!(releases.username.as_deref(), Some("deployer"));
        assert_eq!(releases.password.as_deref(), Some("{COQLCE6DU6GtcS5P=}"));
        let site = settings.server("site").unwrap();
        assert_eq!(site.passphrase.as_deref(), Some("plain passphrase"));
        assert_eq!(site.file_permissions.as_deref(), Some("664"));

        assert_eq!(settings.mirrors.entries.len(), 1);
        let mirror = &settings.mirrors.entries[0];
        assert_eq!(mirror.id, "internal-mirror");
        assert_eq!(mirror.mirror_of.as_deref(), Some("central"));

        assert_eq!(settings.proxies.entries.len(), 1);
        let proxy = &settings.proxies.entries[0];
        assert_eq!(proxy.active, Some(true));
        assert_eq!(proxy.port, Some(3128));
        assert_eq!(
            proxy.non_proxy_hosts.as_deref(),
            Some("localhost|*.example.com")
        );
    }

    #[test]
    fn test_empty_document_parses_to_defaults() {
        let settings: Settings = quick_xml::de::from_str("<settings/>").unwrap();

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_server_order_is_preserved() {
        let settings: Settings = quick_xml::de::from_str(FULL_SETTINGS).unwrap();
        let ids: Vec<&str> = settings.servers.entries.iter().map(|s| s.id.as_str()).collect();

        assert_eq!(ids, ["releases", "site"]);
    }

    #[test]
    fn test_to_xml_round_trips() {
        let settings: Settings = quick_xml::de::from_str(FULL_SETTINGS).unwrap();
        let xml = settings.to_xml().unwrap();
        let reparsed: Settings = quick_xml::de::from_str(&xml).unwrap();

        assert_eq!(reparsed, settings);
    }

    #[test]
    fn test_to_xml_skips_unset_fields() {
        let settings = Settings {
            servers: Servers {
                entries: vec![Server {
                    id: "releases".to_owned(),
                    ..Default::default()
                }],
            },
            ..Default::default()
        };

        let xml = settings.to_xml().unwrap();

        assert!(xml.contains("<servers>"));
        assert!(!xml.contains("localRepository"));
        assert!(!xml.contains("password"));
        assert!(!xml.contains("proxies"));
    }
}
