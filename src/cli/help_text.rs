pub(super) const ROOT_LONG_ABOUT: &str = "\
Pipeline tools for passing JSON status packets between preservation stages

Each stage of the ADPN ingest pipeline (stage, package, verify, promote)
reports what it did as a JSON packet on stdout. The next stage reads that
packet on stdin, overrides whatever its own switches say, and prints an
updated packet. These commands are the glue between stages.

CORE CONCEPTS:

  Packets:
    A JSON object such as {\"Ingest Title\": \"WPA Folder 01\", \"Ingest Step\":
    \"packaged\"}. Several packets piped together are merged, later keys
    overriding earlier ones. A top-level \"parameters\" list of [name, value]
    pairs is reachable as @name.

  Switches:
    Every subcommand accepts free-form --name=value switches. Values come
    from the command line first, then the piped packet, then
    <script>.defaults.conf, then the adpnet.json settings file.

COMMANDS:

  json
    Read a packet and print selected values, as plain text for a shell
    variable, as JSON for the next stage, or through a template.

  json-to-switches
    Turn a packet into --name=value lines for scripts that take switches.

  manifest-property
    Read properties out of a plugin JAR manifest.

EXIT CODES:

  0    success
  1    a requested key was not found
  2    no packet could be decoded, or invalid switches
  3    an input file could not be read
  254  output could not be rendered
  255  interrupted
  1NN  an external program exited with status NN

Run 'adpn <COMMAND> --help' for the switches of a command.
";

pub(crate) const JSON_USAGE: &str = "\
Usage: <INPUT> | adpn json [--key=<KEY>]... [SWITCHES]... [FILE|-]...
       adpn json --key=<KEY> --value=<VALUE> [--key=<KEY> --value=<VALUE>]...

Query mode (default) reads one or more packets, merges them and prints the
selected keys. A key written @name falls back to the packet's parameters
list. With exactly one key the value is printed as plain text with no
trailing newline, ready for VAR=$(...). A missing key exits with status 1.

Construction mode (any --value given) pairs each --key with a --value and
prints the resulting packet as JSON. A packet piped in at the same time has
the pairs stamped over it.

Switches:
  --key=<KEY>          Select a key; repeat for several keys
  --value=<VALUE>      Value for the --key in the same position
  --where=<KEY:VALUE>  Keep records whose KEY equals VALUE (or matches /REGEX/)
  --output=<FORMAT>    text/plain, application/json, text/tab-separated-values,
                       urlencode or multipart/form-data; JSON accepts
                       ;indent=N or ;prettyprint
  --indent=<N>         Indentation for JSON output
  --template=<TEXT>    Render each row through %(name)s fields; $n, $t and
                       $json are also available, backslash escapes decoded
  --prolog=<TEXT>      Text printed before each output line
  --epilog=<TEXT>      Text printed after each output line
  --screen             Pick packets out of surrounding text from the start
  --no-splat           Keep one-element lists as lists
  --verbose=<N>        Diagnostic level (0-2); --quiet silences, --debug=N raises
  --help, --version
";

pub(crate) const JSON_TO_SWITCHES_USAGE: &str = "\
Usage: <INPUT> | adpn json-to-switches [SWITCHES]... [FILE|-]...

Input: a block of text holding one or more JSON packets, possibly labeled
(\"JSON PACKET: {...}\"). Labels and other text are ignored and the packets
are merged into one.

Output: one --<KEY>=<VALUE> switch per line, for example:

  --au_title=WPA Folder 01
  --jar=http://configuration.adpn.org/overhead/takeover/plugins/AlabamaDepartmentOfArchivesAndHistoryDirectoryPlugin.jar
  --plugin-id=gov.alabama.archives.adpn.directory.AlabamaDepartmentOfArchivesAndHistoryDirectoryPlugin
  --remote=1
  --subdirectory=WPA-Folder-01

A switch given on the command line (e.g. --au_title=...) replaces the value
taken from the packet.
";

pub(crate) const MANIFEST_PROPERTY_USAGE: &str = "\
Usage: adpn manifest-property [MANIFEST|JAR|-] [KEY]... [SWITCHES]...

Reads a JAR manifest (from a MANIFEST.MF file, from META-INF/MANIFEST.MF
inside a .jar via unzip, or from stdin) and prints the value of each KEY on
its own line, or !!! for a key the manifest lacks. With no keys, prints the
whole manifest as a JSON packet (see --output in 'adpn json --help').
";
