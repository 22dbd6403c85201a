//! Prompt builders for both flows

pub fn tool_system_prompt() -> String {
    "Eres un asistente de análisis de datos de una empresa. Respondes preguntas \
usando las herramientas disponibles:
- get_context: devuelve la descripción del negocio.
- get_database_schema_tool: devuelve el esquema de la base de datos SQLite.
- execute_sql: ejecuta una consulta SQL y devuelve las filas en JSON.

Antes de escribir SQL consulta el esquema. Para preguntas que listan, cuentan, \
filtran, ordenan o agregan registros usa siempre execute_sql aunque el contexto \
parezca contener la respuesta. Responde en español, de forma breve, citando \
los datos obtenidos."
        .to_string()
}

/// Classification prompt; the model must answer with one label only
pub fn decision_prompt(question: &str, context: &str) -> String {
    format!(
        "Clasifica la pregunta del usuario en una de dos categorías.

Contexto de la empresa:
{context}

Pregunta: {question}

Reglas, en orden de prioridad:
1. Si la pregunta pide listar, contar, filtrar, ordenar o agregar registros, \
responde sql. Esto incluye cualquier pregunta que mencione datos que viven en \
filas (países, fechas, productos concretos, precios, cantidades), aunque el \
contexto parezca contener una respuesta parecida.
2. Responde contexto solo si la pregunta es puramente descriptiva sobre el \
negocio y la respuesta completa aparece literalmente en el contexto.
3. Ante la duda, responde sql.

Responde únicamente con una palabra: contexto o sql"
    )
}

pub fn context_answer_prompt(question: &str, context: &str) -> String {
    format!(
        "Responde la pregunta usando solo la información del contexto.

Contexto de la empresa:
{context}

Pregunta: {question}

Responde en español de forma clara y breve."
    )
}

pub fn sql_generation_prompt(question: &str, context: &str, schema: &str) -> String {
    format!(
        "Escribe una consulta SQL para SQLite que responda la pregunta.

Contexto de la empresa:
{context}

ESQUEMA DE LA BASE DE DATOS:
{schema}

Pregunta: {question}

Instrucciones:
- Usa solo tablas y columnas del esquema.
- Usa funciones de SQLite: strftime para fechas, || para concatenar, \
LIMIT en lugar de TOP.
- Para contar usa COUNT(*); para totales usa SUM.
- Termina la consulta con punto y coma.

Ejemplos:
Pregunta: ¿Cuántas ventas hay en Chile?
SQL: SELECT COUNT(*) FROM ventas WHERE pais = 'Chile';
Pregunta: ¿Cuál es el producto más vendido?
SQL: SELECT producto, COUNT(*) AS total FROM ventas GROUP BY producto ORDER BY total DESC LIMIT 1;

Devuelve solo la consulta SQL, sin explicaciones."
    )
}

pub fn interpretation_prompt(question: &str, sql: &str, results: &str) -> String {
    format!(
        "El usuario preguntó: {question}

Se ejecutó la consulta:
{sql}

Resultados (JSON):
{results}

Explica los resultados en español, de forma clara y breve, respondiendo \
directamente la pregunta. Si no hay resultados, dilo."
    )
}
