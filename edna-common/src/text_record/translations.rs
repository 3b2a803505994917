//! Localized field labels
//!
//! Info files repeat the same record in several languages. Labels are mapped
//! back to their English form so one allow-list serves every section; values
//! stay in the section's language.

/// Localized label → canonical label, applied in this order
type LabelTable = &'static [(&'static str, &'static str)];

const EN: LabelTable = &[
    ("Geographic Location", "Geographic location"),
    ("geographic location", "Geographic location"),
    ("geographic Location", "Geographic location"),
    ("Levels of protection", "Levels of protection"),
    ("Level of protection", "Levels of protection"),
];

const ES: LabelTable = &[
    ("Título", "Title"),
    ("Autores", "Authors"),
    ("Afiliación", "Affiliation"),
    ("Correo electrónico", "Email"),
    ("Descripción", "Description"),
    ("Tipología", "Typology"),
    ("Ubicación geográfica", "Geographic location"),
    ("Localización geográfica", "Geographic location"),
    ("Clima", "Climate"),
    ("Ecosistema y hábitats", "Ecosystem and habitats"),
    ("Actividades humanas", "Human activities"),
    ("Niveles de protección", "Levels of protection"),
    ("Estrategia de muestreo", "Sampling strategy"),
    ("Datos y recursos", "Data and resources"),
    ("Información geoespacial", "Geospatial information"),
    ("Palabras clave", "Keywords"),
    ("Citación", "Citation"),
    ("Conjuntos de datos relacionados", "Related datasets"),
    ("Información sobre financiación", "Funding information"),
    ("Detalles del autor", "Author details"),
];

const FR: LabelTable = &[
    ("Titre", "Title"),
    ("Auteurs", "Authors"),
    ("Affiliation", "Affiliation"),
    ("Courriel", "Email"),
    ("Description", "Description"),
    ("Typologie", "Typology"),
    ("Localisation géographique", "Geographic location"),
    ("Climat", "Climate"),
    ("Écosystème et habitats", "Ecosystem and habitats"),
    ("Activités humaines", "Human activities"),
    ("Niveaux de protection", "Levels of protection"),
    ("Stratégie d'échantillonnage", "Sampling strategy"),
    ("Données et ressources", "Data and resources"),
    ("Informations géospatiales", "Geospatial information"),
    ("Mots-clés", "Keywords"),
    ("Citation", "Citation"),
    ("Ensembles de données associés", "Related datasets"),
    ("Informations de financement", "Funding information"),
    ("Détails de l'auteur", "Author details"),
];

fn table(section: &str) -> Option<LabelTable> {
    match section {
        "en" => Some(EN),
        "es" => Some(ES),
        "fr" => Some(FR),
        _ => None,
    }
}

/// Replace the first occurrence of every known label of `section`
///
/// Sections without a table are returned unchanged.
pub fn translate_line(section: &str, line: &str) -> String {
    let Some(labels) = table(section) else {
        return line.to_string();
    };

    labels
        .iter()
        .fold(line.to_string(), |acc, (from, to)| acc.replacen(from, to, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spanish_labels() {
        assert_eq!(
            translate_line("es", "Descripción: Tipología: Gran río. Clima: Mediterráneo."),
            "Description: Typology: Gran río. Climate: Mediterráneo."
        );
    }

    #[test]
    fn test_french_labels() {
        assert_eq!(
            translate_line("fr", "Niveaux de protection: Natura 2000"),
            "Levels of protection: Natura 2000"
        );
        assert_eq!(
            translate_line("fr", "Localisation géographique: Camargue"),
            "Geographic location: Camargue"
        );
    }

    #[test]
    fn test_english_normalization() {
        assert_eq!(
            translate_line("en", "Level of protection: none"),
            "Levels of protection: none"
        );
        assert_eq!(
            translate_line("en", "Geographic Location: Rhine"),
            "Geographic location: Rhine"
        );
    }

    #[test]
    fn test_only_first_occurrence_replaced() {
        assert_eq!(
            translate_line("es", "Clima: Clima templado"),
            "Climate: Clima templado"
        );
    }

    #[test]
    fn test_unknown_section_untouched() {
        assert_eq!(translate_line("default", "Clima: x"), "Clima: x");
        assert_eq!(translate_line("de", "Titel: x"), "Titel: x");
    }
}
