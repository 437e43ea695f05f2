use crate::domain::entities::table::Tone;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidePage {
    ExpensesPage,
    ExpenseForm,
    IncomesPage,
    IncomeForm,
    DeleteIncome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalKind {
    CreatePrivateCategory { name: String },
    ReactivateCategory { name: String },
    DeleteConfirmation { item: String },
    MergeCategories { target: String, count: usize },
    Info { message: String },
    Guide(GuidePage),
    PrivacyPolicy,
}

impl ModalKind {
    pub fn title(&self) -> &'static str {
        match self {
            ModalKind::CreatePrivateCategory { .. } => "Crear categoría personal",
            ModalKind::ReactivateCategory { .. } => "Reactivar categoría",
            ModalKind::DeleteConfirmation { .. } => "Confirmar eliminación",
            ModalKind::MergeCategories { .. } => "Fusionar categorías",
            ModalKind::Info { .. } => "Información",
            ModalKind::Guide(GuidePage::ExpensesPage) => "Guía: pestaña de gastos",
            ModalKind::Guide(GuidePage::ExpenseForm) => "Guía: registrar un gasto",
            ModalKind::Guide(GuidePage::IncomesPage) => "Guía: pestaña de ingresos",
            ModalKind::Guide(GuidePage::IncomeForm) => "Guía: registrar un ingreso",
            ModalKind::Guide(GuidePage::DeleteIncome) => "Guía: eliminar ingresos",
            ModalKind::PrivacyPolicy => "Política de privacidad y datos",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            ModalKind::CreatePrivateCategory { .. } => Tone::Accent,
            ModalKind::ReactivateCategory { .. } => Tone::Info,
            ModalKind::DeleteConfirmation { .. } => Tone::Negative,
            ModalKind::MergeCategories { .. } => Tone::Warning,
            ModalKind::Info { .. } | ModalKind::PrivacyPolicy => Tone::Neutral,
            ModalKind::Guide(_) => Tone::Positive,
        }
    }

    /// Confirmations resolve to yes/no; everything else only has "close".
    pub fn is_confirmation(&self) -> bool {
        matches!(
            self,
            ModalKind::CreatePrivateCategory { .. }
                | ModalKind::ReactivateCategory { .. }
                | ModalKind::DeleteConfirmation { .. }
                | ModalKind::MergeCategories { .. }
        )
    }

    pub fn confirm_label(&self) -> &'static str {
        match self {
            ModalKind::CreatePrivateCategory { .. } => "Crear",
            ModalKind::ReactivateCategory { .. } => "Reactivar",
            ModalKind::DeleteConfirmation { .. } => "Eliminar",
            ModalKind::MergeCategories { .. } => "Fusionar",
            _ => "Entendido",
        }
    }

    pub fn paragraphs(&self) -> Vec<String> {
        match self {
            ModalKind::CreatePrivateCategory { name } => vec![
                format!("Nombre: {name}"),
                "Esta categoría solo será visible para ti; otros usuarios no podrán usarla.".into(),
                "Si necesitas que sea global, pídeselo a un administrador.".into(),
            ],
            ModalKind::ReactivateCategory { name } => vec![
                format!("Seleccionaste \"{name}\", una categoría desactivada."),
                "Si confirmas, se activará de nuevo. Los registros históricos no cambian.".into(),
            ],
            ModalKind::DeleteConfirmation { item } => vec![
                format!("¿Seguro que deseas eliminar {item}?"),
                "Esta acción no se puede deshacer.".into(),
            ],
            ModalKind::MergeCategories { target, count } => vec![
                format!("Se moverán {count} categorías duplicadas a \"{target}\"."),
                "Sus gastos e ingresos quedarán asignados a la categoría destino.".into(),
            ],
            ModalKind::Info { message } if message.trim().is_empty() => {
                vec!["Sin información adicional.".into()]
            }
            ModalKind::Info { message } => vec![message.clone()],
            ModalKind::Guide(page) => guide_paragraphs(*page),
            ModalKind::PrivacyPolicy => vec![
                "Solo guardamos lo necesario: correo, nombre y los movimientos que registras.".into(),
                "Tus datos se usan únicamente para tus reportes personales y no se comparten con terceros.".into(),
                "Puedes solicitar la exportación o eliminación de tu cuenta al administrador.".into(),
            ],
        }
    }
}

fn guide_paragraphs(page: GuidePage) -> Vec<String> {
    let lines: &[&str] = match page {
        GuidePage::ExpensesPage => &[
            "Aquí ves y registras tus gastos.",
            "Haz clic en una fila para ver el desglose de sus conceptos.",
        ],
        GuidePage::ExpenseForm => &[
            "Divide el gasto en conceptos, cada uno con su propia categoría.",
            "Si la categoría no existe, escríbela y elige \"Crear\": será privada.",
            "Revisa el total estimado antes de guardar.",
        ],
        GuidePage::IncomesPage => &[
            "Aquí registras tus entradas de dinero: sueldos, pagos o intereses.",
            "Haz clic en un ingreso para ver los conceptos que lo componen.",
        ],
        GuidePage::IncomeForm => &[
            "La descripción nombra el ingreso completo y la fuente es opcional.",
            "Puedes desglosarlo en varios conceptos con su monto.",
        ],
        GuidePage::DeleteIncome => &[
            "Eliminar un ingreso borra también todos sus conceptos.",
            "Si solo quieres corregir un monto, edita el ingreso.",
        ],
    };
    lines.iter().map(|line| line.to_string()).collect()
}
