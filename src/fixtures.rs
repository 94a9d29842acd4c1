#[cfg(test)]
pub mod test {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Serialize};
    use serde_json::{Value, json};

    use crate::builder::ConfigType;

    /// Latest shape (version 2) of the test config used across engine tests.
    ///
    /// History: v0 `{version, env}` → v1 adds `services` → v2 renames `env`
    /// to `defaultEnv`.
    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    #[serde(rename_all = "camelCase", deny_unknown_fields)]
    pub struct TestConfig {
        pub version: u32,
        pub default_env: String,
        pub services: BTreeMap<String, String>,
    }

    const ENVS: [&str; 3] = ["dev", "testnet", "mainnet"];

    pub fn schema_v0() -> Value {
        json!({
            "type": "object",
            "properties": {
                "version": { "type": "integer", "const": 0 },
                "env": { "type": "string", "enum": ENVS }
            },
            "required": ["version", "env"],
            "additionalProperties": false
        })
    }

    pub fn schema_v1() -> Value {
        json!({
            "type": "object",
            "properties": {
                "version": { "type": "integer", "const": 1 },
                "env": { "type": "string", "enum": ENVS },
                "services": {
                    "type": "object",
                    "additionalProperties": { "type": "string" }
                }
            },
            "required": ["version", "env", "services"],
            "additionalProperties": false
        })
    }

    pub fn schema_v2() -> Value {
        json!({
            "type": "object",
            "properties": {
                "version": { "type": "integer", "const": 2 },
                "defaultEnv": { "type": "string", "enum": ENVS },
                "services": {
                    "type": "object",
                    "additionalProperties": { "type": "string" }
                }
            },
            "required": ["version", "defaultEnv", "services"],
            "additionalProperties": false
        })
    }

    pub fn migrate_v0_to_v1(mut value: Value) -> Result<Value, String> {
        value["version"] = json!(1);
        value["services"] = json!({});
        Ok(value)
    }

    pub fn migrate_v1_to_v2(mut value: Value) -> Result<Value, String> {
        let map = value.as_object_mut().ok_or("not an object")?;
        map.insert("version".into(), json!(2));
        let env = map.remove("env").ok_or("missing env")?;
        map.insert("defaultEnv".into(), env);
        Ok(value)
    }

    pub fn test_config_type() -> ConfigType<TestConfig> {
        ConfigType::builder("app.yaml")
            .schema(schema_v0())
            .schema(schema_v1())
            .schema(schema_v2())
            .migration(migrate_v0_to_v1)
            .migration(migrate_v1_to_v2)
            .default_template("version: 0\nenv: testnet\n")
            .build()
            .expect("test config type registers cleanly")
    }

    #[test]
    fn fixture_registers_cleanly() {
        let config_type = test_config_type();
        assert_eq!(config_type.latest_version(), 2);
    }

    #[test]
    fn fixture_migrations_compose_to_latest() {
        let v0 = json!({ "version": 0, "env": "dev" });
        let v1 = migrate_v0_to_v1(v0).unwrap();
        let v2 = migrate_v1_to_v2(v1).unwrap();
        assert_eq!(
            v2,
            json!({ "version": 2, "defaultEnv": "dev", "services": {} })
        );
    }
}
