//! Normalização de respostas da API
//!
//! A API do Bloom Growth devolve JSON com chaves PascalCase, datas como
//! string em formatos variados e campos opcionais ausentes. Este módulo
//! converte esse material bruto em [`NormalizedRecord`]: um mapa estável com
//! chaves canônicas snake_case, lookup insensível à representação da chave
//! (`"DueDate"`, `"dueDate"` e `"due_date"` encontram o mesmo campo) e
//! coerção de campos temporais conhecidos para [`DateTime<Utc>`].
//!
//! Falha de parse de data nunca é erro: o valor original passa adiante como
//! string. Campos de data são opcionais e inconsistentes na origem, e
//! derrubar o registro inteiro por um campo malformado seria pior que a
//! passagem best-effort.
//!
//! Tudo aqui é puro: sem I/O, determinístico para a mesma entrada.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Campos reconhecidos como temporais, comparados de forma canônica
const DATE_FIELDS: [&str; 7] = [
    "due_date",
    "created_at",
    "completed_at",
    "closed_at",
    "updated_at",
    "week_start",
    "week_end",
];

/// Valor de um campo normalizado
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Valor JSON inalterado (escalares e arrays)
    Json(Value),
    /// Campo temporal com parse bem-sucedido
    DateTime(DateTime<Utc>),
    /// Objeto aninhado, normalizado recursivamente
    Record(NormalizedRecord),
}

impl FieldValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Json(value) => value.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Json(value) => value.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Json(value) => value.as_str(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Json(value) => value.as_bool(),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&NormalizedRecord> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Self::Json(Value::Array(items)) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Json(Value::Null))
    }
}

/// Registro imutável produzido pela normalização
///
/// Chaves são armazenadas em snake_case canônico, na ordem de inserção.
/// O lookup dobra a chave consultada para a mesma forma canônica, então
/// qualquer representação do mesmo campo lógico encontra o mesmo valor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRecord {
    fields: Vec<(String, FieldValue)>,
}

/// Sequência ordenada de registros normalizados
///
/// A ordem reflete a ordenação do servidor e não deve ser reordenada.
pub type NormalizedCollection = Vec<NormalizedRecord>;

impl NormalizedRecord {
    /// Busca um campo de forma insensível à representação da chave
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        let wanted = fold_key(key);
        self.fields
            .iter()
            .find(|(name, _)| fold_key(name) == wanted)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Chaves canônicas, na ordem de inserção
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    // Acessores tipados para os campos lógicos mais comuns

    pub fn id(&self) -> Option<i64> {
        self.get("id").and_then(FieldValue::as_i64)
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(FieldValue::as_str)
    }

    /// Campo temporal já coercido; `None` se ausente ou não parseado
    pub fn date(&self, key: &str) -> Option<DateTime<Utc>> {
        self.get(key).and_then(FieldValue::as_datetime)
    }

    fn push(&mut self, key: String, value: FieldValue) {
        self.fields.push((key, value));
    }
}

/// Normaliza um objeto JSON decodificado
///
/// `Null` (e qualquer valor que não seja objeto) vira `None`. Objetos
/// aninhados são percorridos recursivamente; elementos de arrays não são.
pub fn transform_record(value: &Value) -> Option<NormalizedRecord> {
    let map = value.as_object()?;

    let mut record = NormalizedRecord::default();
    for (key, raw) in map {
        let canonical = snake_case(key);
        let field = match raw {
            Value::Object(_) => match transform_record(raw) {
                Some(nested) => FieldValue::Record(nested),
                None => FieldValue::Json(raw.clone()),
            },
            Value::String(text) if is_date_field(&canonical) && !text.is_empty() => {
                match parse_date(text) {
                    Some(parsed) => FieldValue::DateTime(parsed),
                    None => FieldValue::Json(raw.clone()),
                }
            }
            _ => FieldValue::Json(raw.clone()),
        };
        record.push(canonical, field);
    }

    Some(record)
}

/// Normaliza um array de objetos, preservando a ordem
///
/// `Null` (ou qualquer valor que não seja array) vira uma sequência vazia;
/// elementos nulos são descartados.
pub fn transform_collection(value: &Value) -> NormalizedCollection {
    match value.as_array() {
        Some(items) => items.iter().filter_map(transform_record).collect(),
        None => Vec::new(),
    }
}

fn is_date_field(canonical: &str) -> bool {
    let folded = fold_key(canonical);
    DATE_FIELDS.iter().any(|field| fold_key(field) == folded)
}

/// Parse estrito de data/hora: RFC 3339, depois datetime e data simples
/// assumidos em UTC (mesmo resultado observável do `DateTime.parse` usado
/// pela API na prática)
fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(parsed.and_utc());
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(parsed.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

/// Acesso encadeado nil-safe a um caminho aninhado
///
/// Qualquer segmento ausente resulta em `Value::Null`, tornando a ausência
/// explícita no valor em vez de um panic no meio do reshape.
pub(crate) fn dig(value: &Value, path: &[&str]) -> Value {
    let mut current = value;
    for segment in path {
        let next = match current {
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => current.get(segment),
        };
        match next {
            Some(next) => current = next,
            None => return Value::Null,
        }
    }
    current.clone()
}

/// Forma canônica de armazenamento: snake_case minúsculo
fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev_lower = false;
    for ch in key.chars() {
        if ch == '-' || ch == ' ' {
            out.push('_');
            prev_lower = false;
        } else if ch.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            prev_lower = false;
        } else {
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
            out.push(ch);
        }
    }
    out
}

/// Forma dobrada para comparação: minúsculas, só alfanuméricos
fn fold_key(key: &str) -> String {
    key.chars()
        .filter(|ch| ch.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_null_record_is_none() {
        assert_eq!(transform_record(&Value::Null), None);
    }

    #[test]
    fn test_null_and_empty_collections_are_empty() {
        assert_eq!(transform_collection(&Value::Null), Vec::new());
        assert_eq!(transform_collection(&json!([])), Vec::new());
    }

    #[test]
    fn test_lookup_is_insensitive_to_key_representation() {
        let record = transform_record(&json!({"Id": 1})).unwrap();
        assert_eq!(record.get("id").and_then(FieldValue::as_i64), Some(1));
        assert_eq!(record.get("Id").and_then(FieldValue::as_i64), Some(1));
        assert_eq!(record.get("ID").and_then(FieldValue::as_i64), Some(1));
        assert_eq!(record.id(), Some(1));
    }

    #[test]
    fn test_keys_are_stored_as_snake_case() {
        let record = transform_record(&json!({"DueDate": "x", "NotesUrl": "y"})).unwrap();
        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["due_date", "notes_url"]);
    }

    #[test]
    fn test_well_formed_date_is_parsed() {
        let record =
            transform_record(&json!({"due_date": "2024-06-10T00:00:00Z"})).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        assert_eq!(record.date("due_date"), Some(expected));
        // Qualquer representação da chave alcança o valor coercido
        assert_eq!(record.date("DueDate"), Some(expected));
    }

    #[test]
    fn test_plain_date_is_parsed_as_utc_midnight() {
        let record = transform_record(&json!({"week_start": "2024-06-10"})).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        assert_eq!(record.date("week_start"), Some(expected));
    }

    #[test]
    fn test_malformed_date_passes_through_unchanged() {
        let record = transform_record(&json!({"due_date": "not-a-date"})).unwrap();
        assert_eq!(
            record.get("due_date").and_then(FieldValue::as_str),
            Some("not-a-date")
        );
    }

    #[test]
    fn test_empty_and_non_string_date_values_pass_through() {
        let record = transform_record(&json!({
            "due_date": "",
            "created_at": 1717977600,
            "closed_at": null
        }))
        .unwrap();
        assert_eq!(record.get("due_date").and_then(FieldValue::as_str), Some(""));
        assert_eq!(
            record.get("created_at").and_then(FieldValue::as_i64),
            Some(1717977600)
        );
        assert!(record.get("closed_at").unwrap().is_null());
    }

    #[test]
    fn test_non_date_fields_are_not_coerced() {
        let record = transform_record(&json!({"title": "2024-06-10"})).unwrap();
        assert_eq!(record.title(), Some("2024-06-10"));
    }

    #[test]
    fn test_nested_maps_are_walked_recursively() {
        let record = transform_record(&json!({
            "id": 7,
            "meeting_details": {"id": 9, "created_at": "2024-06-10T08:30:00Z"}
        }))
        .unwrap();

        let nested = record.get("meeting_details").unwrap().as_record().unwrap();
        assert_eq!(nested.id(), Some(9));
        let expected = Utc.with_ymd_and_hms(2024, 6, 10, 8, 30, 0).unwrap();
        assert_eq!(nested.date("created_at"), Some(expected));
    }

    #[test]
    fn test_array_elements_are_not_walked() {
        let record = transform_record(&json!({
            "attendees": [{"CreateTime": "2024-06-10T00:00:00Z"}]
        }))
        .unwrap();

        let attendees = record.get("attendees").unwrap().as_array().unwrap();
        assert_eq!(
            attendees[0]["CreateTime"],
            json!("2024-06-10T00:00:00Z")
        );
    }

    #[test]
    fn test_collection_preserves_input_order() {
        let collection = transform_collection(&json!([
            {"Id": 3}, {"Id": 1}, {"Id": 2}
        ]));
        let ids: Vec<i64> = collection.iter().filter_map(NormalizedRecord::id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_null_elements_are_dropped() {
        let collection = transform_collection(&json!([{"Id": 1}, null]));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_dig_returns_null_for_missing_segments() {
        let value = json!({"Owner": {"Id": 2}, "Origins": [{"Name": "L10"}]});
        assert_eq!(dig(&value, &["Owner", "Id"]), json!(2));
        assert_eq!(dig(&value, &["Origins", "0", "Name"]), json!("L10"));
        assert_eq!(dig(&value, &["Owner", "Missing"]), Value::Null);
        assert_eq!(dig(&value, &["Origins", "5", "Name"]), Value::Null);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let input = json!({"Id": 1, "DueDate": "2024-06-10", "Owner": {"Id": 2}});
        assert_eq!(transform_record(&input), transform_record(&input));
    }
}
