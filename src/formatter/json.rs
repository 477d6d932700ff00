use crate::collector::Reading;

/// JSON представление показания для коллектора и локального журнала
pub struct JsonFormatter;

impl JsonFormatter {
    /// Тело HTTP запроса: все поля показания
    pub fn to_json_bytes(reading: &Reading) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(reading)
    }

    /// Одна строка NDJSON, завершенная переводом строки
    pub fn to_json_line(reading: &Reading) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(reading)?;
        line.push('\n');
        Ok(line)
    }
}
