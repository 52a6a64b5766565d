use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::model::catalog::{Catalog, CatalogItem, District, OrderLine};

/// Reply the model must give when a single product exceeds the unit cap.
pub const QUANTITY_LIMIT_MESSAGE: &str = "Lamento informarte que el límite máximo de cantidad por producto es de 100 unidades. Por favor, reduce la cantidad para procesar tu pedido.";

pub const EMPTY_MENU_SENTENCE: &str = "No hay platos disponibles.";

/// Lima has stayed on UTC-5 without DST since 1994.
const LIMA_UTC_OFFSET_HOURS: i64 = 5;

/// Everything the system prompt is rendered from.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub menu: &'a [CatalogItem],
    pub districts: &'a [District],
    pub drinks: &'a [CatalogItem],
    pub desserts: &'a [CatalogItem],
    pub pickup_address: &'a str,
    pub timestamp: &'a str,
}

impl<'a> PromptContext<'a> {
    pub fn new(catalog: &'a Catalog, pickup_address: &'a str, timestamp: &'a str) -> Self {
        Self {
            menu: &catalog.menu,
            districts: &catalog.districts,
            drinks: &catalog.drinks,
            desserts: &catalog.desserts,
            pickup_address,
            timestamp,
        }
    }
}

/// `YYYY-MM-DD HH:MM:SS` wall-clock time in Lima.
pub fn lima_timestamp(now: DateTime<Utc>) -> String {
    let lima = now.naive_utc() - TimeDelta::hours(LIMA_UTC_OFFSET_HOURS);
    lima.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Two-decimal money amount, half away from zero.
fn money(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Markdown table shown to the customer in the greeting.
pub fn render_menu_table(items: &[CatalogItem]) -> String {
    if items.is_empty() {
        return EMPTY_MENU_SENTENCE.to_string();
    }

    let mut table = String::new();
    table.push_str("| **Plato** | **Descripción** | **Precio** |\n");
    table.push_str("|-----------|-----------------|-------------|\n");

    for item in items {
        table.push_str(&format!(
            "| {} | {} | S/{} |\n",
            item.name,
            item.description,
            money(item.price)
        ));
    }

    table
}

/// Plain listing used inside the system prompt.
pub fn render_menu_listing(items: &[CatalogItem]) -> String {
    let mut text = String::from("Aquí está nuestra carta:\n");
    for item in items {
        text.push_str(&format!(
            "{}: {} - {} soles\n",
            item.name, item.description, item.price
        ));
    }
    text
}

pub fn render_district_list(districts: &[District]) -> String {
    let mut text = String::from("Los distritos de reparto son:\n");
    for district in districts {
        text.push_str(&format!("**{}**\n", district.name));
    }
    text
}

pub fn render_confirmed_order(lines: &[OrderLine]) -> String {
    let mut table = String::new();
    table.push_str("| **Plato** | **Cantidad** | **Precio Total** |\n");
    table.push_str("|-----------|--------------|------------------|\n");

    for line in lines {
        table.push_str(&format!(
            "| {} | {} | S/{} |\n",
            line.name,
            line.quantity,
            money(line.total)
        ));
    }

    let total: Decimal = lines.iter().map(|l| l.total).sum();
    table.push_str(&format!(
        "| **Total** |              | **S/ {}**      |\n",
        money(total)
    ));

    table
}

/// First assistant message of every conversation.
pub fn build_greeting(menu: &[CatalogItem]) -> String {
    format!(
        "¿Qué te puedo ofrecer?\n\nEste es el menú del día:\n\n{}",
        render_menu_table(menu)
    )
}

/// Builds the system prompt. The result is a single line: every newline of
/// the template and of the embedded tables is replaced by a space.
pub fn build_system_prompt(context: &PromptContext<'_>) -> String {
    let mut prompt = String::new();

    push_role(&mut prompt, context);
    push_quantity_rules(&mut prompt);
    push_delivery_rules(&mut prompt, context);
    push_order_summary(&mut prompt);
    push_extras(&mut prompt, context);
    push_confirmation(&mut prompt, context);

    prompt.replace('\n', " ")
}

fn push_role(prompt: &mut String, context: &PromptContext<'_>) {
    prompt.push_str(
        "Eres el bot de pedidos de Sazón, amable y servicial. Ayudas a los clientes a hacer sus pedidos \
y siempre confirmas que solo pidan platos que están en el menú oficial. \
Aquí tienes el menú para mostrárselo a los clientes:\n",
    );
    prompt.push_str(&render_menu_listing(context.menu));
    prompt.push('\n');

    prompt.push_str("También repartimos en los siguientes distritos: ");
    prompt.push_str(&render_district_list(context.districts));
    prompt.push_str(".\n\n");

    prompt.push_str(
        "Primero, saluda al cliente y ofrécele el menú. Asegúrate de que el cliente solo seleccione \
platos que están en el menú actual y explícales que no podemos preparar platos fuera del menú.\n\
El cliente puede indicar la cantidad en texto o en números.\n",
    );
}

fn push_quantity_rules(prompt: &mut String) {
    prompt.push_str(
        "**IMPORTANTE: Validación de cantidad solicitada**\n\
- Si la cantidad solicitada está en el rango de 1 a 100 (inclusive), acepta el pedido sin mostrar advertencias.\n\
- Si la cantidad solicitada es mayor que 100, muestra el siguiente mensaje:\n",
    );
    prompt.push('"');
    prompt.push_str(QUANTITY_LIMIT_MESSAGE);
    prompt.push_str("\"\n\n");
}

fn push_delivery_rules(prompt: &mut String, context: &PromptContext<'_>) {
    prompt.push_str(
        "Pregunta si desea recoger su pedido en el local o si prefiere entrega a domicilio.\n\
Si elige entrega, pregúntale al cliente a qué distrito desea que se le envíe su pedido, \
confirma que el distrito esté dentro de las zonas de reparto y verifica el distrito de entrega con el cliente.\n",
    );
    prompt.push_str(&format!(
        "Si el pedido es para recoger, invítalo a acercarse a nuestro local ubicado en {}.\n\n",
        context.pickup_address
    ));
    prompt.push_str("Usa solo español peruano en tus respuestas.\n\n");
}

fn push_order_summary(prompt: &mut String) {
    prompt.push_str(
        "Antes de continuar, confirma que el cliente haya ingresado un método de entrega válido. \
Luego, resume el pedido en la siguiente tabla:\n\
| **Plato**      | **Cantidad** | **Precio Total** |\n\
|----------------|--------------|------------------|\n\
|                |              |                  |\n\
| **Total**      |              | **S/ 0.00**      |\n\n",
    );
}

fn push_extras(prompt: &mut String, context: &PromptContext<'_>) {
    prompt.push_str("Pregunta al cliente si quiere añadir una bebida o postre.\n");
    prompt.push_str(&format!(
        "- Si responde bebida, muéstrale únicamente la carta de bebidas {}.\n",
        render_menu_listing(context.drinks)
    ));
    prompt.push_str(&format!(
        "- Si responde postre, muéstrale solo la carta de postres {}.\n",
        render_menu_listing(context.desserts)
    ));
    prompt.push_str(
        "Si el cliente agrega postres o bebidas, incorpóralos en la tabla de resumen como un plato adicional \
y calcula el monto total nuevamente.\n\n",
    );
}

fn push_confirmation(prompt: &mut String, context: &PromptContext<'_>) {
    prompt.push_str(
        "Pregunta al cliente: \"¿Estás de acuerdo con el pedido?\" y espera su confirmación.\n\n\
Luego, si confirma, pide el método de pago (tarjeta de crédito, efectivo u otra opción disponible). \
Verifica que haya ingresado un método de pago antes de continuar.\n\n",
    );
    prompt.push_str(&format!(
        "Una vez que el cliente confirme el método de pago, registra la hora actual de Perú como el timestamp {} \
de la confirmación.\n",
        context.timestamp
    ));
    prompt.push_str("El pedido confirmado será:\n");
    prompt.push_str(&render_confirmed_order(&[OrderLine::placeholder()]));
    prompt.push('\n');
    prompt.push_str(
        "Recuerda siempre confirmar que el pedido y el método de pago estén completos antes de registrarlo.\n",
    );
}
